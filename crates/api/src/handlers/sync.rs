//! Offline synchronisation for incomes, expenses, and receivables.
//!
//! Clients identify records by their own `client_id` UUID. Pull returns every
//! row (tombstones included) changed after a cursor; push reconciles each
//! record independently with last-writer-wins on `updated_at`.

use axum::extract::{Query, State};
use axum::Json;
use hearth_core::category::{ensure_kind, KIND_EXPENSE, KIND_INCOME};
use hearth_core::money::validate_amount;
use hearth_core::receivable::{
    ensure_sync_transition, validate_debtor, validate_received_on, validate_status, STATUS_PENDING,
};
use hearth_core::sync::{decide, validate_batch_size, SyncDecision, SyncStatus};
use hearth_core::types::{DbId, Timestamp};
use hearth_db::models::expense::{Expense, SyncExpense};
use hearth_db::models::income::{Income, SyncIncome};
use hearth_db::models::receivable::{Receivable, SyncReceivable};
use hearth_db::repositories::{CategoryRepo, ExpenseRepo, IncomeRepo, ReceivableRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid, AppResult};
use crate::handlers::incomes::validate_description;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `?since=RFC3339`. Absent means a full download.
#[derive(Debug, Deserialize)]
pub struct PullParams {
    pub since: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct PullResponse {
    /// Cursor for the next pull. Taken from the database clock before reading,
    /// and no later than the start of any open transaction.
    pub server_time: Timestamp,
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub receivables: Vec<Receivable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PushRequest {
    #[serde(default)]
    pub incomes: Vec<SyncIncome>,
    #[serde(default)]
    pub expenses: Vec<SyncExpense>,
    #[serde(default)]
    pub receivables: Vec<SyncReceivable>,
}

/// Result for one pushed record.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub client_id: Uuid,
    pub status: SyncStatus,
    /// `updated_at` of the row the server now holds.
    pub server_updated_at: Option<Timestamp>,
    pub error: Option<String>,
}

impl SyncOutcome {
    fn stored(client_id: Uuid, decision: SyncDecision, updated_at: Timestamp) -> Self {
        Self {
            client_id,
            status: decision.into(),
            server_updated_at: Some(updated_at),
            error: None,
        }
    }

    fn rejected(client_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            client_id,
            status: SyncStatus::Rejected,
            server_updated_at: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub incomes: Vec<SyncOutcome>,
    pub expenses: Vec<SyncOutcome>,
    pub receivables: Vec<SyncOutcome>,
}

const FOREIGN_RECORD: &str = "client_id is already used by another family";
const STORE_FAILED: &str = "Record could not be stored";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/sync/pull
pub async fn pull(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PullParams>,
) -> AppResult<Json<DataResponse<PullResponse>>> {
    let server_time = hearth_db::sync_cursor(&state.pool).await?;
    let incomes = IncomeRepo::changed_since(&state.pool, auth.family_id, params.since).await?;
    let expenses = ExpenseRepo::changed_since(&state.pool, auth.family_id, params.since).await?;
    let receivables =
        ReceivableRepo::changed_since(&state.pool, auth.family_id, params.since).await?;

    tracing::debug!(
        family_id = auth.family_id,
        incomes = incomes.len(),
        expenses = expenses.len(),
        receivables = receivables.len(),
        "Sync pull"
    );

    Ok(Json(DataResponse {
        data: PullResponse {
            server_time,
            incomes,
            expenses,
            receivables,
        },
    }))
}

/// POST /api/v1/sync/push
///
/// A failing record is reported as `rejected`; the rest of the batch still
/// applies.
pub async fn push(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<PushRequest>,
) -> AppResult<Json<DataResponse<PushResponse>>> {
    validate_batch_size("incomes", input.incomes.len()).map_err(invalid)?;
    validate_batch_size("expenses", input.expenses.len()).map_err(invalid)?;
    validate_batch_size("receivables", input.receivables.len()).map_err(invalid)?;

    let mut incomes = Vec::with_capacity(input.incomes.len());
    for record in &input.incomes {
        incomes.push(push_income(&state, &auth, record).await);
    }
    let mut expenses = Vec::with_capacity(input.expenses.len());
    for record in &input.expenses {
        expenses.push(push_expense(&state, &auth, record).await);
    }
    let mut receivables = Vec::with_capacity(input.receivables.len());
    for record in &input.receivables {
        receivables.push(push_receivable(&state, &auth, record).await);
    }

    let rejected = incomes
        .iter()
        .chain(&expenses)
        .chain(&receivables)
        .filter(|o| o.status == SyncStatus::Rejected)
        .count();
    tracing::info!(
        family_id = auth.family_id,
        user_id = auth.user_id,
        incomes = incomes.len(),
        expenses = expenses.len(),
        receivables = receivables.len(),
        rejected,
        "Sync push"
    );

    Ok(Json(DataResponse {
        data: PushResponse {
            incomes,
            expenses,
            receivables,
        },
    }))
}

// ---------------------------------------------------------------------------
// Per-record reconciliation
// ---------------------------------------------------------------------------

async fn push_income(state: &AppState, auth: &AuthUser, record: &SyncIncome) -> SyncOutcome {
    let client_id = record.client_id;
    if let Err(msg) = validate_transaction(
        state,
        auth.family_id,
        &record.description,
        record.amount,
        record.category_id,
        KIND_INCOME,
    )
    .await
    {
        return SyncOutcome::rejected(client_id, msg);
    }

    let existing = match IncomeRepo::find_by_client_id(&state.pool, client_id).await {
        Ok(existing) => existing,
        Err(e) => return store_failed(client_id, &e),
    };
    if existing.as_ref().is_some_and(|e| e.family_id != auth.family_id) {
        return SyncOutcome::rejected(client_id, FOREIGN_RECORD);
    }

    let decision = decide(record.updated_at, existing.as_ref().map(|e| e.updated_at));
    let stored = match (decision, existing) {
        (SyncDecision::Create, _) => {
            IncomeRepo::sync_insert(&state.pool, auth.family_id, auth.user_id, record)
                .await
                .map(Some)
        }
        (SyncDecision::Apply, Some(server)) => {
            IncomeRepo::sync_apply(&state.pool, auth.family_id, server.id, record).await
        }
        (_, server) => Ok(server),
    };

    match stored {
        Ok(Some(row)) => SyncOutcome::stored(client_id, decision, row.updated_at),
        Ok(None) => SyncOutcome::rejected(client_id, STORE_FAILED),
        Err(e) => store_failed(client_id, &e),
    }
}

async fn push_expense(state: &AppState, auth: &AuthUser, record: &SyncExpense) -> SyncOutcome {
    let client_id = record.client_id;
    if let Err(msg) = validate_transaction(
        state,
        auth.family_id,
        &record.description,
        record.amount,
        record.category_id,
        KIND_EXPENSE,
    )
    .await
    {
        return SyncOutcome::rejected(client_id, msg);
    }

    let existing = match ExpenseRepo::find_by_client_id(&state.pool, client_id).await {
        Ok(existing) => existing,
        Err(e) => return store_failed(client_id, &e),
    };
    if existing.as_ref().is_some_and(|e| e.family_id != auth.family_id) {
        return SyncOutcome::rejected(client_id, FOREIGN_RECORD);
    }

    let decision = decide(record.updated_at, existing.as_ref().map(|e| e.updated_at));
    let stored = match (decision, existing) {
        (SyncDecision::Create, _) => {
            ExpenseRepo::sync_insert(&state.pool, auth.family_id, auth.user_id, record)
                .await
                .map(Some)
        }
        (SyncDecision::Apply, Some(server)) => {
            ExpenseRepo::sync_apply(&state.pool, auth.family_id, server.id, record).await
        }
        (_, server) => Ok(server),
    };

    match stored {
        Ok(Some(row)) => SyncOutcome::stored(client_id, decision, row.updated_at),
        Ok(None) => SyncOutcome::rejected(client_id, STORE_FAILED),
        Err(e) => store_failed(client_id, &e),
    }
}

async fn push_receivable(
    state: &AppState,
    auth: &AuthUser,
    record: &SyncReceivable,
) -> SyncOutcome {
    let client_id = record.client_id;
    let valid = validate_debtor(&record.debtor)
        .and_then(|()| validate_amount(record.amount))
        .and_then(|()| validate_status(&record.status))
        .and_then(|()| validate_received_on(&record.status, record.received_on));
    if let Err(msg) = valid {
        return SyncOutcome::rejected(client_id, msg);
    }

    let existing = match ReceivableRepo::find_by_client_id(&state.pool, client_id).await {
        Ok(existing) => existing,
        Err(e) => return store_failed(client_id, &e),
    };
    if existing.as_ref().is_some_and(|e| e.family_id != auth.family_id) {
        return SyncOutcome::rejected(client_id, FOREIGN_RECORD);
    }

    let decision = decide(record.updated_at, existing.as_ref().map(|e| e.updated_at));
    let stored = match (decision, existing) {
        (SyncDecision::Create, _) => {
            ReceivableRepo::sync_insert(&state.pool, auth.family_id, auth.user_id, record)
                .await
                .map(Some)
        }
        (SyncDecision::Apply, Some(server)) => {
            if let Err(msg) = ensure_sync_transition(&server.status, &record.status) {
                return SyncOutcome::rejected(client_id, msg);
            }
            let applied = if server.status == STATUS_PENDING {
                record.clone()
            } else {
                settled_copy(&server, record)
            };
            ReceivableRepo::sync_apply(&state.pool, auth.family_id, server.id, &applied).await
        }
        (_, server) => Ok(server),
    };

    match stored {
        Ok(Some(row)) => SyncOutcome::stored(client_id, decision, row.updated_at),
        Ok(None) => SyncOutcome::rejected(client_id, STORE_FAILED),
        Err(e) => store_failed(client_id, &e),
    }
}

/// A settled receivable keeps its contents; a client may only delete it.
fn settled_copy(server: &Receivable, record: &SyncReceivable) -> SyncReceivable {
    SyncReceivable {
        client_id: server.client_id,
        debtor: server.debtor.clone(),
        description: server.description.clone(),
        amount: server.amount,
        due_on: server.due_on,
        status: server.status.clone(),
        received_on: server.received_on,
        updated_at: record.updated_at,
        deleted_at: record.deleted_at,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Same rules as the REST endpoints, reported as a message instead of a 400.
async fn validate_transaction(
    state: &AppState,
    family_id: DbId,
    description: &str,
    amount: hearth_core::types::Money,
    category_id: Option<DbId>,
    kind: &str,
) -> Result<(), String> {
    validate_description(description).map_err(|e| e.to_string())?;
    validate_amount(amount)?;
    if let Some(category_id) = category_id {
        let category = CategoryRepo::find_by_id(&state.pool, family_id, category_id)
            .await
            .map_err(|_| STORE_FAILED.to_string())?
            .ok_or_else(|| format!("Category {category_id} does not exist"))?;
        ensure_kind(kind, &category.kind)?;
    }
    Ok(())
}

fn store_failed(client_id: Uuid, err: &sqlx::Error) -> SyncOutcome {
    tracing::warn!(%client_id, error = %err, "Sync record could not be stored");
    SyncOutcome::rejected(client_id, STORE_FAILED)
}
