//! Handlers for the `/budgets` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hearth_core::budget::{evaluate, validate_threshold, BudgetStatus};
use hearth_core::category::KIND_EXPENSE;
use hearth_core::error::CoreError;
use hearth_core::money::validate_amount;
use hearth_core::period::Month;
use hearth_core::types::DbId;
use hearth_db::models::budget::{Budget, BudgetWithSpending, CreateBudget, UpdateBudget};
use hearth_db::repositories::{BudgetRepo, ExpenseRepo};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, AppError, AppResult};
use crate::handlers::categories::require_category;
use crate::middleware::auth::AuthUser;
use crate::query::MonthParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A budget row together with its evaluated status.
#[derive(Debug, Serialize)]
pub struct BudgetView<B: Serialize> {
    #[serde(flatten)]
    pub budget: B,
    pub status: BudgetStatus,
}

/// Request body for `POST /budgets/copy`.
#[derive(Debug, Deserialize)]
pub struct CopyBudgetsRequest {
    pub from: Month,
    pub to: Month,
}

#[derive(Debug, Serialize)]
pub struct CopyBudgetsResponse {
    pub copied: u64,
}

/// GET /api/v1/budgets?month=YYYY-MM
pub async fn list_budgets(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<DataResponse<Vec<BudgetView<BudgetWithSpending>>>>> {
    let month = params.month_or_current();
    let rows =
        BudgetRepo::list_with_spending(&state.pool, auth.family_id, month.first_day()).await?;

    let data = rows
        .into_iter()
        .map(|row| {
            let status = evaluate(
                row.budget.amount_limit,
                row.spent,
                row.budget.alert_threshold_pct,
            );
            BudgetView { budget: row, status }
        })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/budgets
pub async fn create_budget(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBudget>,
) -> AppResult<(StatusCode, Json<DataResponse<BudgetView<Budget>>>)> {
    validate_amount(input.amount_limit).map_err(invalid)?;
    if let Some(threshold) = input.alert_threshold_pct {
        validate_threshold(threshold).map_err(invalid)?;
    }
    require_category(&state, auth.family_id, input.category_id, KIND_EXPENSE).await?;

    let budget = BudgetRepo::create(&state.pool, auth.family_id, &input).await?;
    let view = with_status(&state, budget).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/budgets/{id}
pub async fn get_budget(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BudgetView<Budget>>>> {
    let budget = BudgetRepo::find_by_id(&state.pool, auth.family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Budget",
            id,
        }))?;
    let view = with_status(&state, budget).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/budgets/{id}
pub async fn update_budget(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBudget>,
) -> AppResult<Json<DataResponse<BudgetView<Budget>>>> {
    if let Some(limit) = input.amount_limit {
        validate_amount(limit).map_err(invalid)?;
    }
    if let Some(threshold) = input.alert_threshold_pct {
        validate_threshold(threshold).map_err(invalid)?;
    }

    let budget = BudgetRepo::update(&state.pool, auth.family_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Budget",
            id,
        }))?;
    let view = with_status(&state, budget).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/budgets/{id}
pub async fn delete_budget(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if BudgetRepo::delete(&state.pool, auth.family_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Budget",
            id,
        }))
    }
}

/// POST /api/v1/budgets/copy
///
/// Copy every budget of `from` into `to`. Categories already budgeted in
/// `to` are left untouched.
pub async fn copy_budgets(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CopyBudgetsRequest>,
) -> AppResult<Json<DataResponse<CopyBudgetsResponse>>> {
    if input.from == input.to {
        return Err(invalid("Source and target months must differ".into()));
    }
    let copied = BudgetRepo::copy_month(
        &state.pool,
        auth.family_id,
        input.from.first_day(),
        input.to.first_day(),
    )
    .await?;

    tracing::info!(
        family_id = auth.family_id,
        from = %input.from,
        to = %input.to,
        copied,
        "Budgets copied"
    );
    Ok(Json(DataResponse {
        data: CopyBudgetsResponse { copied },
    }))
}

async fn with_status(state: &AppState, budget: Budget) -> AppResult<BudgetView<Budget>> {
    let month = Month::of(budget.month);
    let spent = ExpenseRepo::category_total(
        &state.pool,
        budget.family_id,
        budget.category_id,
        month.first_day(),
        month.last_day(),
    )
    .await?;
    let status = evaluate(budget.amount_limit, spent, budget.alert_threshold_pct);
    Ok(BudgetView { budget, status })
}
