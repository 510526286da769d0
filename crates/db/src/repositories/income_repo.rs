//! Repository for the `incomes` table.
//!
//! Rows are soft-deleted so that offline clients can pull tombstones.
//! Regular reads exclude deleted rows; the sync methods include them.

use hearth_core::types::{DbId, Money, Timestamp};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::income::{CreateIncome, Income, IncomeFilter, SyncIncome, UpdateIncome};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, family_id, client_id, category_id, user_id, description, amount, \
                        received_on, is_recurring, notes, created_at, updated_at, deleted_at";

/// Filter clause shared by `list` and `total`. Binds `$1..=$4`.
const FILTER: &str = "family_id = $1 AND deleted_at IS NULL
               AND ($2::date IS NULL OR received_on >= $2)
               AND ($3::date IS NULL OR received_on <= $3)
               AND ($4::bigint IS NULL OR category_id = $4)";

/// Provides CRUD and sync operations for incomes.
pub struct IncomeRepo;

impl IncomeRepo {
    /// Insert a new income, returning the created row.
    ///
    /// Accepts any executor so receiving a receivable can record its
    /// income in the same transaction.
    pub async fn create<'e, E>(
        executor: E,
        family_id: DbId,
        user_id: DbId,
        input: &CreateIncome,
    ) -> Result<Income, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO incomes
                (family_id, client_id, category_id, user_id, description, amount,
                 received_on, is_recurring, notes)
             VALUES ($1, COALESCE($2, gen_random_uuid()), $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(family_id)
            .bind(input.client_id)
            .bind(input.category_id)
            .bind(user_id)
            .bind(input.description.trim())
            .bind(input.amount)
            .bind(input.received_on)
            .bind(input.is_recurring.unwrap_or(false))
            .bind(&input.notes)
            .fetch_one(executor)
            .await
    }

    /// Find a live income by ID within a family.
    pub async fn find_by_id(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Income>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM incomes
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(id)
            .bind(family_id)
            .fetch_optional(pool)
            .await
    }

    /// List live incomes matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        family_id: DbId,
        filter: &IncomeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Income>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM incomes
             WHERE {FILTER}
             ORDER BY received_on DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(family_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Sum of live incomes matching `filter`.
    pub async fn total(
        pool: &PgPool,
        family_id: DbId,
        filter: &IncomeFilter,
    ) -> Result<Money, sqlx::Error> {
        let query = format!("SELECT COALESCE(SUM(amount), 0) FROM incomes WHERE {FILTER}");
        sqlx::query_scalar::<_, Money>(&query)
            .bind(family_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.category_id)
            .fetch_one(pool)
            .await
    }

    /// Update a live income. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &UpdateIncome,
    ) -> Result<Option<Income>, sqlx::Error> {
        let query = format!(
            "UPDATE incomes SET
                category_id = COALESCE($3, category_id),
                description = COALESCE($4, description),
                amount = COALESCE($5, amount),
                received_on = COALESCE($6, received_on),
                is_recurring = COALESCE($7, is_recurring),
                notes = COALESCE($8, notes)
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.category_id)
            .bind(input.description.as_deref().map(str::trim))
            .bind(input.amount)
            .bind(input.received_on)
            .bind(input.is_recurring)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an income. Returns `true` if a live row was deleted.
    pub async fn soft_delete(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE incomes SET deleted_at = NOW()
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(family_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Sync ----

    /// Find an income by its client identifier, including deleted rows.
    pub async fn find_by_client_id(
        pool: &PgPool,
        client_id: Uuid,
    ) -> Result<Option<Income>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM incomes WHERE client_id = $1");
        sqlx::query_as::<_, Income>(&query)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// All rows (including tombstones) written after the `since` cursor, oldest write first.
    pub async fn changed_since(
        pool: &PgPool,
        family_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Vec<Income>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM incomes
             WHERE family_id = $1 AND ($2::timestamptz IS NULL OR synced_at > $2)
             ORDER BY synced_at, id"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(family_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Insert a row pushed by a client, keeping the client's timestamps.
    pub async fn sync_insert(
        pool: &PgPool,
        family_id: DbId,
        user_id: DbId,
        input: &SyncIncome,
    ) -> Result<Income, sqlx::Error> {
        let query = format!(
            "INSERT INTO incomes
                (family_id, client_id, category_id, user_id, description, amount,
                 received_on, is_recurring, notes, updated_at, deleted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(family_id)
            .bind(input.client_id)
            .bind(input.category_id)
            .bind(user_id)
            .bind(input.description.trim())
            .bind(input.amount)
            .bind(input.received_on)
            .bind(input.is_recurring)
            .bind(&input.notes)
            .bind(input.updated_at)
            .bind(input.deleted_at)
            .fetch_one(pool)
            .await
    }

    /// Overwrite an existing row with a newer client version.
    pub async fn sync_apply(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &SyncIncome,
    ) -> Result<Option<Income>, sqlx::Error> {
        let query = format!(
            "UPDATE incomes SET
                category_id = $3,
                description = $4,
                amount = $5,
                received_on = $6,
                is_recurring = $7,
                notes = $8,
                updated_at = $9,
                deleted_at = $10
             WHERE id = $1 AND family_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Income>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.category_id)
            .bind(input.description.trim())
            .bind(input.amount)
            .bind(input.received_on)
            .bind(input.is_recurring)
            .bind(&input.notes)
            .bind(input.updated_at)
            .bind(input.deleted_at)
            .fetch_optional(pool)
            .await
    }
}
