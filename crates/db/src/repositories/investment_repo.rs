//! Repository for the `investments` table.

use hearth_core::types::DbId;
use sqlx::PgPool;

use crate::models::investment::{CreateInvestment, Investment, UpdateInvestment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, family_id, name, kind, institution, amount_invested, current_value, \
                        started_on, notes, created_at, updated_at";

/// Provides CRUD operations for investment positions.
pub struct InvestmentRepo;

impl InvestmentRepo {
    /// Insert a new investment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        family_id: DbId,
        input: &CreateInvestment,
    ) -> Result<Investment, sqlx::Error> {
        let query = format!(
            "INSERT INTO investments
                (family_id, name, kind, institution, amount_invested, current_value,
                 started_on, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Investment>(&query)
            .bind(family_id)
            .bind(input.name.trim())
            .bind(&input.kind)
            .bind(&input.institution)
            .bind(input.amount_invested)
            .bind(input.current_value.unwrap_or(input.amount_invested))
            .bind(input.started_on)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find an investment by ID within a family.
    pub async fn find_by_id(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Investment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM investments WHERE id = $1 AND family_id = $2");
        sqlx::query_as::<_, Investment>(&query)
            .bind(id)
            .bind(family_id)
            .fetch_optional(pool)
            .await
    }

    /// List a family's investments, most recent first.
    pub async fn list(pool: &PgPool, family_id: DbId) -> Result<Vec<Investment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM investments WHERE family_id = $1
             ORDER BY started_on DESC, id DESC"
        );
        sqlx::query_as::<_, Investment>(&query)
            .bind(family_id)
            .fetch_all(pool)
            .await
    }

    /// Update an investment. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &UpdateInvestment,
    ) -> Result<Option<Investment>, sqlx::Error> {
        let query = format!(
            "UPDATE investments SET
                name = COALESCE($3, name),
                kind = COALESCE($4, kind),
                institution = COALESCE($5, institution),
                amount_invested = COALESCE($6, amount_invested),
                current_value = COALESCE($7, current_value),
                started_on = COALESCE($8, started_on),
                notes = COALESCE($9, notes)
             WHERE id = $1 AND family_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Investment>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.kind)
            .bind(&input.institution)
            .bind(input.amount_invested)
            .bind(input.current_value)
            .bind(input.started_on)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete an investment. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, family_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM investments WHERE id = $1 AND family_id = $2")
            .bind(id)
            .bind(family_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
