//! Income model and DTOs.

use chrono::NaiveDate;
use hearth_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `incomes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Income {
    pub id: DbId,
    pub family_id: DbId,
    /// Stable identifier shared with offline clients.
    pub client_id: Uuid,
    pub category_id: Option<DbId>,
    /// Member who recorded the income.
    pub user_id: Option<DbId>,
    pub description: String,
    pub amount: Money,
    pub received_on: NaiveDate,
    pub is_recurring: bool,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for creating an income.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncome {
    pub client_id: Option<Uuid>,
    pub category_id: Option<DbId>,
    pub description: String,
    pub amount: Money,
    pub received_on: NaiveDate,
    pub is_recurring: Option<bool>,
    pub notes: Option<String>,
}

/// DTO for updating an income. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIncome {
    pub category_id: Option<DbId>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub received_on: Option<NaiveDate>,
    pub is_recurring: Option<bool>,
    pub notes: Option<String>,
}

/// An income as pushed by an offline client.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncIncome {
    pub client_id: Uuid,
    pub category_id: Option<DbId>,
    pub description: String,
    pub amount: Money,
    pub received_on: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
    pub notes: Option<String>,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Filters for listing incomes.
#[derive(Debug, Clone, Default)]
pub struct IncomeFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<DbId>,
}
