//! Handlers for the `/receivables` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use hearth_core::category::KIND_INCOME;
use hearth_core::error::CoreError;
use hearth_core::event_types::RECEIVABLE_RECEIVED;
use hearth_core::money::validate_amount;
use hearth_core::receivable::{
    ensure_transition, is_overdue, validate_debtor, validate_status, STATUS_CANCELLED,
    STATUS_RECEIVED,
};
use hearth_core::types::DbId;
use hearth_db::models::receivable::{
    CreateReceivable, ReceiptIncome, Receivable, UpdateReceivable,
};
use hearth_db::repositories::ReceivableRepo;
use hearth_events::FinanceEvent;
use serde::{Deserialize, Serialize};

use crate::error::{invalid, AppError, AppResult};
use crate::handlers::categories::require_category;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `?status=pending|received|cancelled`
#[derive(Debug, Deserialize)]
pub struct ReceivableListParams {
    pub status: Option<String>,
}

/// Request body for `POST /receivables/{id}/receive`.
#[derive(Debug, Default, Deserialize)]
pub struct ReceiveRequest {
    /// Defaults to today.
    pub received_on: Option<NaiveDate>,
    /// Also record the money as an income.
    #[serde(default)]
    pub create_income: bool,
    /// Income category for the recorded income.
    pub category_id: Option<DbId>,
}

/// A receivable with its overdue flag evaluated for today.
#[derive(Debug, Serialize)]
pub struct ReceivableView {
    #[serde(flatten)]
    pub receivable: Receivable,
    pub is_overdue: bool,
}

impl From<Receivable> for ReceivableView {
    fn from(receivable: Receivable) -> Self {
        let today = Utc::now().date_naive();
        let is_overdue = is_overdue(&receivable.status, receivable.due_on, today);
        Self {
            receivable,
            is_overdue,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/receivables
pub async fn list_receivables(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReceivableListParams>,
) -> AppResult<Json<DataResponse<Vec<ReceivableView>>>> {
    if let Some(status) = &params.status {
        validate_status(status).map_err(invalid)?;
    }
    let rows = ReceivableRepo::list(&state.pool, auth.family_id, params.status.as_deref()).await?;
    let data = rows.into_iter().map(ReceivableView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/receivables
pub async fn create_receivable(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReceivable>,
) -> AppResult<(StatusCode, Json<DataResponse<ReceivableView>>)> {
    validate_debtor(&input.debtor).map_err(invalid)?;
    validate_amount(input.amount).map_err(invalid)?;

    let receivable =
        ReceivableRepo::create(&state.pool, auth.family_id, auth.user_id, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: receivable.into(),
        }),
    ))
}

/// GET /api/v1/receivables/{id}
pub async fn get_receivable(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReceivableView>>> {
    let receivable = find_receivable(&state, auth.family_id, id).await?;
    Ok(Json(DataResponse {
        data: receivable.into(),
    }))
}

/// PUT /api/v1/receivables/{id}
///
/// Only pending receivables can be edited.
pub async fn update_receivable(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReceivable>,
) -> AppResult<Json<DataResponse<ReceivableView>>> {
    if let Some(debtor) = &input.debtor {
        validate_debtor(debtor).map_err(invalid)?;
    }
    if let Some(amount) = input.amount {
        validate_amount(amount).map_err(invalid)?;
    }

    match ReceivableRepo::update(&state.pool, auth.family_id, id, &input).await? {
        Some(receivable) => Ok(Json(DataResponse {
            data: receivable.into(),
        })),
        None => {
            let existing = find_receivable(&state, auth.family_id, id).await?;
            Err(AppError::Core(CoreError::Conflict(format!(
                "Receivable is already {}",
                existing.status
            ))))
        }
    }
}

/// DELETE /api/v1/receivables/{id}
pub async fn delete_receivable(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ReceivableRepo::soft_delete(&state.pool, auth.family_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Receivable",
            id,
        }))
    }
}

/// POST /api/v1/receivables/{id}/receive
///
/// Mark a pending receivable as received. With `create_income`, the money is
/// also recorded as an income linked through `income_id`.
pub async fn receive_receivable(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReceiveRequest>,
) -> AppResult<Json<DataResponse<ReceivableView>>> {
    let existing = find_receivable(&state, auth.family_id, id).await?;
    ensure_transition(&existing.status, STATUS_RECEIVED)
        .map_err(|msg| AppError::Core(CoreError::Conflict(msg)))?;

    if let Some(category_id) = input.category_id {
        require_category(&state, auth.family_id, category_id, KIND_INCOME).await?;
    }

    let receipt = input.create_income.then(|| ReceiptIncome {
        user_id: auth.user_id,
        category_id: input.category_id,
        description: match &existing.description {
            Some(description) => format!("{}: {description}", existing.debtor),
            None => existing.debtor.clone(),
        },
    });
    let received_on = input.received_on.unwrap_or_else(|| Utc::now().date_naive());

    let receivable = ReceivableRepo::receive(
        &state.pool,
        auth.family_id,
        id,
        received_on,
        receipt.as_ref(),
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::Conflict("Receivable is no longer pending".into())))?;

    tracing::info!(
        family_id = auth.family_id,
        receivable_id = id,
        income_id = ?receivable.income_id,
        "Receivable received"
    );
    state.event_bus.publish(
        FinanceEvent::new(RECEIVABLE_RECEIVED, auth.family_id)
            .with_source("receivable", receivable.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "debtor": receivable.debtor,
                "amount": receivable.amount,
            })),
    );

    Ok(Json(DataResponse {
        data: receivable.into(),
    }))
}

/// POST /api/v1/receivables/{id}/cancel
pub async fn cancel_receivable(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReceivableView>>> {
    let existing = find_receivable(&state, auth.family_id, id).await?;
    ensure_transition(&existing.status, STATUS_CANCELLED)
        .map_err(|msg| AppError::Core(CoreError::Conflict(msg)))?;

    let receivable = ReceivableRepo::cancel(&state.pool, auth.family_id, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Receivable is no longer pending".into()))
        })?;
    Ok(Json(DataResponse {
        data: receivable.into(),
    }))
}

async fn find_receivable(state: &AppState, family_id: DbId, id: DbId) -> AppResult<Receivable> {
    ReceivableRepo::find_by_id(&state.pool, family_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Receivable",
            id,
        }))
}
