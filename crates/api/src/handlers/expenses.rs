//! Handlers for the `/expenses` resource.
//!
//! Every write that lands in a budgeted category re-evaluates that month's
//! budget and publishes an alert when spending crosses the warning threshold
//! or the limit.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hearth_core::budget::{crossing, evaluate};
use hearth_core::category::KIND_EXPENSE;
use hearth_core::error::CoreError;
use hearth_core::event_types::EXPENSE_CREATED;
use hearth_core::money::validate_amount;
use hearth_core::period::Month;
use hearth_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use hearth_core::types::{DbId, Money};
use hearth_db::models::expense::{CreateExpense, Expense, ExpenseFilter, UpdateExpense};
use hearth_db::repositories::{BudgetRepo, CategoryRepo, ExpenseRepo};
use hearth_events::FinanceEvent;
use rust_decimal::Decimal;

use crate::error::{invalid, AppError, AppResult};
use crate::handlers::categories::require_category;
use crate::handlers::incomes::validate_description;
use crate::middleware::auth::AuthUser;
use crate::query::TransactionListParams;
use crate::response::{DataResponse, ListWithTotal};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/expenses
pub async fn list_expenses(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Json<DataResponse<ListWithTotal<Expense>>>> {
    let (from, to) = params.window()?;
    let filter = ExpenseFilter {
        from,
        to,
        category_id: params.category_id,
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let items = ExpenseRepo::list(&state.pool, auth.family_id, &filter, limit, offset).await?;
    let total = ExpenseRepo::total(&state.pool, auth.family_id, &filter).await?;

    Ok(Json(DataResponse {
        data: ListWithTotal {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// POST /api/v1/expenses
pub async fn create_expense(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateExpense>,
) -> AppResult<(StatusCode, Json<DataResponse<Expense>>)> {
    validate_description(&input.description)?;
    validate_amount(input.amount).map_err(invalid)?;
    let category_name = match input.category_id {
        Some(category_id) => Some(
            require_category(&state, auth.family_id, category_id, KIND_EXPENSE)
                .await?
                .name,
        ),
        None => None,
    };

    let expense = ExpenseRepo::create(&state.pool, auth.family_id, auth.user_id, &input).await?;

    state.event_bus.publish(
        FinanceEvent::new(EXPENSE_CREATED, auth.family_id)
            .with_source("expense", expense.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "description": expense.description,
                "amount": expense.amount,
                "category": category_name,
            })),
    );

    if let Some(category_id) = expense.category_id {
        let month = Month::of(expense.spent_on);
        if let Err(e) = check_budget(&state, &auth, category_id, month, expense.amount).await {
            tracing::warn!(error = %e, expense_id = expense.id, "Budget check failed");
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: expense })))
}

/// GET /api/v1/expenses/{id}
pub async fn get_expense(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Expense>>> {
    let expense = find_expense(&state, auth.family_id, id).await?;
    Ok(Json(DataResponse { data: expense }))
}

/// PUT /api/v1/expenses/{id}
pub async fn update_expense(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExpense>,
) -> AppResult<Json<DataResponse<Expense>>> {
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    if let Some(amount) = input.amount {
        validate_amount(amount).map_err(invalid)?;
    }
    if let Some(category_id) = input.category_id {
        require_category(&state, auth.family_id, category_id, KIND_EXPENSE).await?;
    }

    let before = find_expense(&state, auth.family_id, id).await?;
    let expense = ExpenseRepo::update(&state.pool, auth.family_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Expense",
            id,
        }))?;

    if let Some(category_id) = expense.category_id {
        let month = Month::of(expense.spent_on);
        let previous = if before.category_id == Some(category_id)
            && Month::of(before.spent_on) == month
        {
            before.amount
        } else {
            Decimal::ZERO
        };
        let added = expense.amount - previous;
        if added > Decimal::ZERO {
            if let Err(e) = check_budget(&state, &auth, category_id, month, added).await {
                tracing::warn!(error = %e, expense_id = expense.id, "Budget check failed");
            }
        }
    }

    Ok(Json(DataResponse { data: expense }))
}

/// DELETE /api/v1/expenses/{id}
pub async fn delete_expense(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ExpenseRepo::soft_delete(&state.pool, auth.family_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Expense",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_expense(state: &AppState, family_id: DbId, id: DbId) -> AppResult<Expense> {
    ExpenseRepo::find_by_id(&state.pool, family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Expense",
            id,
        }))
}

/// Publish a budget alert if adding `added` to the category's spending in
/// `month` crossed the warning threshold or the limit.
///
/// `added` must already be included in the stored total.
async fn check_budget(
    state: &AppState,
    auth: &AuthUser,
    category_id: DbId,
    month: Month,
    added: Money,
) -> AppResult<()> {
    let Some(budget) =
        BudgetRepo::find_for_category(&state.pool, auth.family_id, category_id, month.first_day())
            .await?
    else {
        return Ok(());
    };

    let after = ExpenseRepo::category_total(
        &state.pool,
        auth.family_id,
        category_id,
        month.first_day(),
        month.last_day(),
    )
    .await?;
    let before = after - added;

    let Some(alert) = crossing(
        budget.amount_limit,
        before,
        after,
        budget.alert_threshold_pct,
    ) else {
        return Ok(());
    };

    let category = CategoryRepo::find_by_id(&state.pool, auth.family_id, category_id).await?;
    let status = evaluate(budget.amount_limit, after, budget.alert_threshold_pct);

    tracing::info!(
        family_id = auth.family_id,
        budget_id = budget.id,
        event_type = alert.event_type(),
        "Budget threshold crossed"
    );

    state.event_bus.publish(
        FinanceEvent::new(alert.event_type(), auth.family_id)
            .with_source("budget", budget.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "category": category.map(|c| c.name),
                "month": month,
                "spent": status.spent,
                "limit": status.limit,
                "percent_used": status.percent_used,
            })),
    );

    Ok(())
}
