//! CSV report downloads.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{Datelike, NaiveDate, Utc};
use hearth_core::category::{KIND_EXPENSE, KIND_INCOME};
use hearth_core::dashboard::UNCATEGORIZED;
use hearth_core::period::{DateRange, Month};
use hearth_core::report::{
    monthly_csv, transactions_csv, validate_report_kind, MonthlyRow, TransactionRow,
    REPORT_KIND_ALL, REPORT_KIND_EXPENSE, REPORT_KIND_INCOME,
};
use hearth_core::types::Money;
use hearth_db::models::dashboard::MonthlyTotal;
use hearth_db::repositories::DashboardRepo;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{invalid, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// `?from=&to=&kind=all|income|expense`. Dates default to the current month.
#[derive(Debug, Deserialize)]
pub struct TransactionReportParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<String>,
}

/// `?year=YYYY`, defaulting to the current year.
#[derive(Debug, Deserialize)]
pub struct MonthlyReportParams {
    pub year: Option<i32>,
}

/// GET /api/v1/reports/transactions.csv
pub async fn transactions_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TransactionReportParams>,
) -> AppResult<Response> {
    let current = Month::of(Utc::now().date_naive());
    let range = DateRange::new(
        params.from.unwrap_or_else(|| current.first_day()),
        params.to.unwrap_or_else(|| current.last_day()),
    )
    .map_err(invalid)?;

    let kind = params.kind.as_deref().unwrap_or(REPORT_KIND_ALL);
    validate_report_kind(kind).map_err(invalid)?;
    let kind_filter = match kind {
        REPORT_KIND_INCOME => Some(KIND_INCOME),
        REPORT_KIND_EXPENSE => Some(KIND_EXPENSE),
        _ => None,
    };

    let lines = DashboardRepo::transactions_between(
        &state.pool,
        auth.family_id,
        range.from,
        range.to,
        kind_filter,
    )
    .await?;

    let rows: Vec<TransactionRow> = lines
        .into_iter()
        .map(|line| TransactionRow {
            date: line.occurred_on,
            kind: if line.kind == KIND_INCOME {
                REPORT_KIND_INCOME
            } else {
                REPORT_KIND_EXPENSE
            },
            category: line.category_name.unwrap_or_else(|| UNCATEGORIZED.to_string()),
            description: line.description,
            amount: line.amount,
            recorded_by: line.recorded_by.unwrap_or_default(),
        })
        .collect();

    let body = transactions_csv(&rows).map_err(|e| AppError::InternalError(e.to_string()))?;
    tracing::debug!(family_id = auth.family_id, rows = rows.len(), "Transaction report generated");

    Ok(csv_response(
        format!("transactions-{}-{}.csv", range.from, range.to),
        body,
    ))
}

/// GET /api/v1/reports/monthly.csv
///
/// One row per month of the year, including months with no activity.
pub async fn monthly_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MonthlyReportParams>,
) -> AppResult<Response> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let months = Month::year_months(year).map_err(invalid)?;
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Err(invalid(format!("Invalid year {year}")));
    };
    let (from, to) = (first.first_day(), last.last_day());

    let incomes = DashboardRepo::monthly_income(&state.pool, auth.family_id, from, to).await?;
    let expenses = DashboardRepo::monthly_expense(&state.pool, auth.family_id, from, to).await?;
    let incomes = by_month(&incomes);
    let expenses = by_month(&expenses);

    let rows: Vec<MonthlyRow> = months
        .iter()
        .map(|m| {
            let income = incomes.get(m).copied().unwrap_or(Decimal::ZERO);
            let expense = expenses.get(m).copied().unwrap_or(Decimal::ZERO);
            MonthlyRow {
                month: *m,
                income,
                expense,
                balance: income - expense,
            }
        })
        .collect();

    let body = monthly_csv(&rows).map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(csv_response(format!("monthly-{year}.csv"), body))
}

fn by_month(rows: &[MonthlyTotal]) -> HashMap<Month, Money> {
    rows.iter().map(|r| (Month::of(r.month), r.total)).collect()
}

fn csv_response(filename: String, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
