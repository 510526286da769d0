//! Receivable model and DTOs.

use chrono::NaiveDate;
use hearth_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `receivables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Receivable {
    pub id: DbId,
    pub family_id: DbId,
    pub client_id: Uuid,
    pub debtor: String,
    pub description: Option<String>,
    pub amount: Money,
    pub due_on: NaiveDate,
    /// `pending`, `received`, or `cancelled`.
    pub status: String,
    pub received_on: Option<NaiveDate>,
    /// Income recorded when the receivable was received, if any.
    pub income_id: Option<DbId>,
    pub overdue_notified_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for creating a receivable.
#[derive(Debug, Deserialize)]
pub struct CreateReceivable {
    pub client_id: Option<Uuid>,
    pub debtor: String,
    pub description: Option<String>,
    pub amount: Money,
    pub due_on: NaiveDate,
}

/// DTO for updating a pending receivable. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReceivable {
    pub debtor: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub due_on: Option<NaiveDate>,
}

/// A receivable as pushed by an offline client.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncReceivable {
    pub client_id: Uuid,
    pub debtor: String,
    pub description: Option<String>,
    pub amount: Money,
    pub due_on: NaiveDate,
    pub status: String,
    pub received_on: Option<NaiveDate>,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Income to record alongside marking a receivable received.
#[derive(Debug)]
pub struct ReceiptIncome {
    pub user_id: DbId,
    pub category_id: Option<DbId>,
    pub description: String,
}

/// Pending totals shown on the dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReceivableSummary {
    pub pending_count: i64,
    pub pending_total: Money,
    pub overdue_count: i64,
    pub overdue_total: Money,
}
