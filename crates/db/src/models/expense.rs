//! Expense model and DTOs.

use chrono::NaiveDate;
use hearth_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `expenses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Expense {
    pub id: DbId,
    pub family_id: DbId,
    /// Stable identifier shared with offline clients.
    pub client_id: Uuid,
    pub category_id: Option<DbId>,
    /// Member who recorded the expense.
    pub user_id: Option<DbId>,
    pub description: String,
    pub amount: Money,
    pub spent_on: NaiveDate,
    pub payment_method: Option<String>,
    pub is_recurring: bool,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for creating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpense {
    pub client_id: Option<Uuid>,
    pub category_id: Option<DbId>,
    pub description: String,
    pub amount: Money,
    pub spent_on: NaiveDate,
    pub payment_method: Option<String>,
    pub is_recurring: Option<bool>,
    pub notes: Option<String>,
}

/// DTO for updating an expense. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpense {
    pub category_id: Option<DbId>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub spent_on: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub is_recurring: Option<bool>,
    pub notes: Option<String>,
}

/// An expense as pushed by an offline client.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncExpense {
    pub client_id: Uuid,
    pub category_id: Option<DbId>,
    pub description: String,
    pub amount: Money,
    pub spent_on: NaiveDate,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub notes: Option<String>,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Filters for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<DbId>,
}
