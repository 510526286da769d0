//! Aggregate rows returned by dashboard and report queries.

use chrono::NaiveDate;
use hearth_core::types::{DbId, Money};
use serde::Serialize;
use sqlx::FromRow;

/// Sum of amounts for one category.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotal {
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub total: Money,
}

/// Sum of amounts for one month (`month` is the first day).
#[derive(Debug, Clone, FromRow)]
pub struct MonthlyTotal {
    pub month: NaiveDate,
    pub total: Money,
}

/// One income or expense, flattened for the dashboard feed and CSV reports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionLine {
    pub id: DbId,
    /// `income` or `expense`.
    pub kind: String,
    pub description: String,
    pub amount: Money,
    pub occurred_on: NaiveDate,
    pub category_name: Option<String>,
    pub recorded_by: Option<String>,
}
