//! Family (tenant) model and DTOs.

use hearth_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `families` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Family {
    pub id: DbId,
    pub name: String,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a family.
#[derive(Debug)]
pub struct CreateFamily {
    pub name: String,
    pub currency: String,
}

/// DTO for updating a family. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateFamily {
    pub name: Option<String>,
    pub currency: Option<String>,
}
