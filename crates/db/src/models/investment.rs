//! Investment model and DTOs.

use chrono::NaiveDate;
use hearth_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `investments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Investment {
    pub id: DbId,
    pub family_id: DbId,
    pub name: String,
    pub kind: String,
    pub institution: Option<String>,
    pub amount_invested: Money,
    pub current_value: Money,
    pub started_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an investment.
#[derive(Debug, Deserialize)]
pub struct CreateInvestment {
    pub name: String,
    pub kind: String,
    pub institution: Option<String>,
    pub amount_invested: Money,
    /// Defaults to `amount_invested` when omitted.
    pub current_value: Option<Money>,
    pub started_on: NaiveDate,
    pub notes: Option<String>,
}

/// DTO for updating an investment. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInvestment {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub institution: Option<String>,
    pub amount_invested: Option<Money>,
    pub current_value: Option<Money>,
    pub started_on: Option<NaiveDate>,
    pub notes: Option<String>,
}
