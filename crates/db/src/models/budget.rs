//! Budget model and DTOs.

use chrono::NaiveDate;
use hearth_core::period::Month;
use hearth_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `budgets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Budget {
    pub id: DbId,
    pub family_id: DbId,
    pub category_id: DbId,
    /// First day of the budgeted month.
    pub month: NaiveDate,
    pub amount_limit: Money,
    pub alert_threshold_pct: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A budget joined with its category name and the month's spending.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BudgetWithSpending {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub budget: Budget,
    pub category_name: String,
    pub spent: Money,
}

/// DTO for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudget {
    pub category_id: DbId,
    pub month: Month,
    pub amount_limit: Money,
    pub alert_threshold_pct: Option<i32>,
}

/// DTO for updating a budget. Category and month are fixed.
#[derive(Debug, Deserialize)]
pub struct UpdateBudget {
    pub amount_limit: Option<Money>,
    pub alert_threshold_pct: Option<i32>,
}
