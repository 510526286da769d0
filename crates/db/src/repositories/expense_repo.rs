//! Repository for the `expenses` table.
//!
//! Rows are soft-deleted so that offline clients can pull tombstones.

use chrono::NaiveDate;
use hearth_core::types::{DbId, Money, Timestamp};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::expense::{CreateExpense, Expense, ExpenseFilter, SyncExpense, UpdateExpense};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, family_id, client_id, category_id, user_id, description, amount, \
                        spent_on, payment_method, is_recurring, notes, created_at, updated_at, \
                        deleted_at";

/// Filter clause shared by `list` and `total`. Binds `$1..=$4`.
const FILTER: &str = "family_id = $1 AND deleted_at IS NULL
               AND ($2::date IS NULL OR spent_on >= $2)
               AND ($3::date IS NULL OR spent_on <= $3)
               AND ($4::bigint IS NULL OR category_id = $4)";

/// Provides CRUD and sync operations for expenses.
pub struct ExpenseRepo;

impl ExpenseRepo {
    /// Insert a new expense, returning the created row.
    pub async fn create(
        pool: &PgPool,
        family_id: DbId,
        user_id: DbId,
        input: &CreateExpense,
    ) -> Result<Expense, sqlx::Error> {
        let query = format!(
            "INSERT INTO expenses
                (family_id, client_id, category_id, user_id, description, amount,
                 spent_on, payment_method, is_recurring, notes)
             VALUES ($1, COALESCE($2, gen_random_uuid()), $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(family_id)
            .bind(input.client_id)
            .bind(input.category_id)
            .bind(user_id)
            .bind(input.description.trim())
            .bind(input.amount)
            .bind(input.spent_on)
            .bind(&input.payment_method)
            .bind(input.is_recurring.unwrap_or(false))
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a live expense by ID within a family.
    pub async fn find_by_id(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(family_id)
            .fetch_optional(pool)
            .await
    }

    /// List live expenses matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        family_id: DbId,
        filter: &ExpenseFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses
             WHERE {FILTER}
             ORDER BY spent_on DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(family_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Sum of live expenses matching `filter`.
    pub async fn total(
        pool: &PgPool,
        family_id: DbId,
        filter: &ExpenseFilter,
    ) -> Result<Money, sqlx::Error> {
        let query = format!("SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE {FILTER}");
        sqlx::query_scalar::<_, Money>(&query)
            .bind(family_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.category_id)
            .fetch_one(pool)
            .await
    }

    /// Spending in one category between two dates (inclusive).
    pub async fn category_total(
        pool: &PgPool,
        family_id: DbId,
        category_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Money, sqlx::Error> {
        let filter = ExpenseFilter {
            from: Some(from),
            to: Some(to),
            category_id: Some(category_id),
        };
        Self::total(pool, family_id, &filter).await
    }

    /// Update a live expense. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &UpdateExpense,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "UPDATE expenses SET
                category_id = COALESCE($3, category_id),
                description = COALESCE($4, description),
                amount = COALESCE($5, amount),
                spent_on = COALESCE($6, spent_on),
                payment_method = COALESCE($7, payment_method),
                is_recurring = COALESCE($8, is_recurring),
                notes = COALESCE($9, notes)
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.category_id)
            .bind(input.description.as_deref().map(str::trim))
            .bind(input.amount)
            .bind(input.spent_on)
            .bind(&input.payment_method)
            .bind(input.is_recurring)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an expense. Returns `true` if a live row was deleted.
    pub async fn soft_delete(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE expenses SET deleted_at = NOW()
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(family_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Sync ----

    /// Find an expense by its client identifier, including deleted rows.
    pub async fn find_by_client_id(
        pool: &PgPool,
        client_id: Uuid,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE client_id = $1");
        sqlx::query_as::<_, Expense>(&query)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// All rows (including tombstones) written after the `since` cursor, oldest write first.
    pub async fn changed_since(
        pool: &PgPool,
        family_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses
             WHERE family_id = $1 AND ($2::timestamptz IS NULL OR synced_at > $2)
             ORDER BY synced_at, id"
        );
        sqlx::query_as::<_, Expense>(&query)
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
        input: &SyncExpense,
    ) -> Result<Expense, sqlx::Error> {
        let query = format!(
            "INSERT INTO expenses
                (family_id, client_id, category_id, user_id, description, amount,
                 spent_on, payment_method, is_recurring, notes, updated_at, deleted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(family_id)
            .bind(input.client_id)
            .bind(input.category_id)
            .bind(user_id)
            .bind(input.description.trim())
            .bind(input.amount)
            .bind(input.spent_on)
            .bind(&input.payment_method)
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
        input: &SyncExpense,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "UPDATE expenses SET
                category_id = $3,
                description = $4,
                amount = $5,
                spent_on = $6,
                payment_method = $7,
                is_recurring = $8,
                notes = $9,
                updated_at = $10,
                deleted_at = $11
             WHERE id = $1 AND family_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.category_id)
            .bind(input.description.trim())
            .bind(input.amount)
            .bind(input.spent_on)
            .bind(&input.payment_method)
            .bind(input.is_recurring)
            .bind(&input.notes)
            .bind(input.updated_at)
            .bind(input.deleted_at)
            .fetch_optional(pool)
            .await
    }
}
