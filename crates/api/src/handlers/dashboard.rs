//! Handler for the monthly family dashboard.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use hearth_core::budget::evaluate;
use hearth_core::dashboard::{category_shares, fill_trend, CategoryShare, MonthTotals, TrendPoint};
use hearth_core::investment::{summarize, PortfolioSummary};
use hearth_core::period::Month;
use hearth_core::types::{DbId, Money};
use hearth_db::models::budget::BudgetWithSpending;
use hearth_db::models::dashboard::{CategoryTotal, MonthlyTotal, TransactionLine};
use hearth_db::models::receivable::ReceivableSummary;
use hearth_db::repositories::{BudgetRepo, DashboardRepo, InvestmentRepo, ReceivableRepo};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, AppResult};
use crate::handlers::budgets::BudgetView;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Trend length when `months` is not given.
const DEFAULT_TREND_MONTHS: usize = 6;

/// Longest trend a client may request.
const MAX_TREND_MONTHS: usize = 24;

/// Number of transactions in the "recent activity" list.
const RECENT_TRANSACTIONS: i64 = 5;

/// `?month=YYYY-MM&months=N`
#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub month: Option<Month>,
    pub months: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub month: Month,
    pub totals: MonthTotals,
    pub expense_by_category: Vec<CategoryShare>,
    pub income_by_category: Vec<CategoryShare>,
    pub trend: Vec<TrendPoint>,
    pub budgets: Vec<BudgetView<BudgetWithSpending>>,
    pub receivables: ReceivableSummary,
    pub investments: PortfolioSummary,
    pub recent_transactions: Vec<TransactionLine>,
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    let today = Utc::now().date_naive();
    let month = params.month.unwrap_or_else(|| Month::of(today));
    let trend_len = params.months.unwrap_or(DEFAULT_TREND_MONTHS);
    if !(1..=MAX_TREND_MONTHS).contains(&trend_len) {
        return Err(invalid(format!(
            "months must be between 1 and {MAX_TREND_MONTHS}"
        )));
    }

    let pool = &state.pool;
    let family_id = auth.family_id;
    let (from, to) = (month.first_day(), month.last_day());

    let expense_rows = DashboardRepo::expense_by_category(pool, family_id, from, to).await?;
    let income_rows = DashboardRepo::income_by_category(pool, family_id, from, to).await?;

    let budgets: Vec<BudgetView<BudgetWithSpending>> =
        BudgetRepo::list_with_spending(pool, family_id, from)
            .await?
            .into_iter()
            .map(|row| {
                let status =
                    evaluate(row.budget.amount_limit, row.spent, row.budget.alert_threshold_pct);
                BudgetView { budget: row, status }
            })
            .collect();
    let limits: HashMap<DbId, Money> = budgets
        .iter()
        .map(|b| (b.budget.budget.category_id, b.budget.budget.amount_limit))
        .collect();

    let totals = MonthTotals::new(sum(&income_rows), sum(&expense_rows));

    let mut expense_by_category = category_shares(share_rows(expense_rows));
    for share in &mut expense_by_category {
        share.budget_limit = share.category_id.and_then(|id| limits.get(&id).copied());
    }
    let income_by_category = category_shares(share_rows(income_rows));

    let months = Month::trailing(month, trend_len);
    let trend_from = months.first().map_or(from, Month::first_day);
    let incomes = DashboardRepo::monthly_income(pool, family_id, trend_from, to).await?;
    let expenses = DashboardRepo::monthly_expense(pool, family_id, trend_from, to).await?;
    let trend = fill_trend(&months, &by_month(&incomes), &by_month(&expenses));

    let receivables = ReceivableRepo::summary(pool, family_id, today).await?;

    let positions = InvestmentRepo::list(pool, family_id).await?;
    let investments = summarize(
        positions
            .iter()
            .map(|i| (i.kind.as_str(), i.amount_invested, i.current_value)),
    );

    let recent_transactions =
        DashboardRepo::recent_transactions(pool, family_id, RECENT_TRANSACTIONS).await?;

    Ok(Json(DataResponse {
        data: DashboardResponse {
            month,
            totals,
            expense_by_category,
            income_by_category,
            trend,
            budgets,
            receivables,
            investments,
            recent_transactions,
        },
    }))
}

fn sum(rows: &[CategoryTotal]) -> Money {
    rows.iter().map(|r| r.total).sum()
}

fn share_rows(rows: Vec<CategoryTotal>) -> Vec<(Option<DbId>, Option<String>, Money)> {
    rows.into_iter()
        .map(|r| (r.category_id, r.category_name, r.total))
        .collect()
}

fn by_month(rows: &[MonthlyTotal]) -> Vec<(Month, Money)> {
    rows.iter().map(|r| (Month::of(r.month), r.total)).collect()
}
