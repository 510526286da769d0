//! Handlers for the `/incomes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hearth_core::category::KIND_INCOME;
use hearth_core::error::CoreError;
use hearth_core::event_types::INCOME_CREATED;
use hearth_core::money::validate_amount;
use hearth_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use hearth_core::types::DbId;
use hearth_db::models::income::{CreateIncome, Income, IncomeFilter, UpdateIncome};
use hearth_db::repositories::IncomeRepo;
use hearth_events::FinanceEvent;

use crate::error::{invalid, AppError, AppResult};
use crate::handlers::categories::require_category;
use crate::middleware::auth::AuthUser;
use crate::query::TransactionListParams;
use crate::response::{DataResponse, ListWithTotal};
use crate::state::AppState;

/// GET /api/v1/incomes
///
/// Newest first. `total` is the sum over the whole filter, not just the page.
pub async fn list_incomes(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Json<DataResponse<ListWithTotal<Income>>>> {
    let (from, to) = params.window()?;
    let filter = IncomeFilter {
        from,
        to,
        category_id: params.category_id,
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let items = IncomeRepo::list(&state.pool, auth.family_id, &filter, limit, offset).await?;
    let total = IncomeRepo::total(&state.pool, auth.family_id, &filter).await?;

    Ok(Json(DataResponse {
        data: ListWithTotal {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// POST /api/v1/incomes
pub async fn create_income(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIncome>,
) -> AppResult<(StatusCode, Json<DataResponse<Income>>)> {
    validate_description(&input.description)?;
    validate_amount(input.amount).map_err(invalid)?;
    let category_name = match input.category_id {
        Some(category_id) => Some(
            require_category(&state, auth.family_id, category_id, KIND_INCOME)
                .await?
                .name,
        ),
        None => None,
    };

    let income = IncomeRepo::create(&state.pool, auth.family_id, auth.user_id, &input).await?;

    state.event_bus.publish(
        FinanceEvent::new(INCOME_CREATED, auth.family_id)
            .with_source("income", income.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "description": income.description,
                "amount": income.amount,
                "category": category_name,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: income })))
}

/// GET /api/v1/incomes/{id}
pub async fn get_income(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Income>>> {
    let income = IncomeRepo::find_by_id(&state.pool, auth.family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Income",
            id,
        }))?;
    Ok(Json(DataResponse { data: income }))
}

/// PUT /api/v1/incomes/{id}
pub async fn update_income(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIncome>,
) -> AppResult<Json<DataResponse<Income>>> {
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    if let Some(amount) = input.amount {
        validate_amount(amount).map_err(invalid)?;
    }
    if let Some(category_id) = input.category_id {
        require_category(&state, auth.family_id, category_id, KIND_INCOME).await?;
    }

    let income = IncomeRepo::update(&state.pool, auth.family_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Income",
            id,
        }))?;
    Ok(Json(DataResponse { data: income }))
}

/// DELETE /api/v1/incomes/{id}
///
/// Soft delete: the row stays as a tombstone for offline clients.
pub async fn delete_income(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if IncomeRepo::soft_delete(&state.pool, auth.family_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Income",
            id,
        }))
    }
}

/// Descriptions are required on every transaction.
pub(crate) fn validate_description(description: &str) -> AppResult<()> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(invalid("Description must not be empty".into()));
    }
    if trimmed.chars().count() > 200 {
        return Err(invalid(
            "Description exceeds maximum length of 200 characters".into(),
        ));
    }
    Ok(())
}
