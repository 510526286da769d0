//! Repository for the `receivables` table.

use chrono::NaiveDate;
use hearth_core::receivable::{STATUS_CANCELLED, STATUS_PENDING, STATUS_RECEIVED};
use hearth_core::types::{DbId, Timestamp};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::income::CreateIncome;
use crate::models::receivable::{
    CreateReceivable, ReceiptIncome, Receivable, ReceivableSummary, SyncReceivable,
    UpdateReceivable,
};
use crate::repositories::IncomeRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, family_id, client_id, debtor, description, amount, due_on, status, \
                        received_on, income_id, overdue_notified_at, created_by, created_at, \
                        updated_at, deleted_at";

/// Provides CRUD, lifecycle, and sync operations for receivables.
pub struct ReceivableRepo;

impl ReceivableRepo {
    /// Insert a new pending receivable, returning the created row.
    pub async fn create(
        pool: &PgPool,
        family_id: DbId,
        created_by: DbId,
        input: &CreateReceivable,
    ) -> Result<Receivable, sqlx::Error> {
        let query = format!(
            "INSERT INTO receivables
                (family_id, client_id, debtor, description, amount, due_on, created_by)
             VALUES ($1, COALESCE($2, gen_random_uuid()), $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(family_id)
            .bind(input.client_id)
            .bind(input.debtor.trim())
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.due_on)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a live receivable by ID within a family.
    pub async fn find_by_id(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Receivable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM receivables
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(id)
            .bind(family_id)
            .fetch_optional(pool)
            .await
    }

    /// List live receivables, optionally by status, earliest due first.
    pub async fn list(
        pool: &PgPool,
        family_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<Receivable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM receivables
             WHERE family_id = $1 AND deleted_at IS NULL
               AND ($2::text IS NULL OR status = $2)
             ORDER BY due_on, id"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(family_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update a pending receivable. Settled receivables are immutable.
    pub async fn update(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &UpdateReceivable,
    ) -> Result<Option<Receivable>, sqlx::Error> {
        let query = format!(
            "UPDATE receivables SET
                debtor = COALESCE($3, debtor),
                description = COALESCE($4, description),
                amount = COALESCE($5, amount),
                due_on = COALESCE($6, due_on),
                overdue_notified_at = CASE
                    WHEN $6::date IS NOT NULL AND $6::date <> due_on THEN NULL
                    ELSE overdue_notified_at
                END
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL AND status = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.debtor.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.due_on)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a receivable. Returns `true` if a live row was deleted.
    pub async fn soft_delete(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE receivables SET deleted_at = NOW()
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(family_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a pending receivable as received, optionally recording the
    /// matching income in the same transaction.
    ///
    /// Returns `None` when the receivable does not exist or is no longer pending.
    pub async fn receive(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        received_on: NaiveDate,
        income: Option<&ReceiptIncome>,
    ) -> Result<Option<Receivable>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM receivables
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL AND status = $3
             FOR UPDATE"
        );
        let Some(pending) = sqlx::query_as::<_, Receivable>(&select)
            .bind(id)
            .bind(family_id)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let income_id = match income {
            Some(receipt) => {
                let input = CreateIncome {
                    client_id: None,
                    category_id: receipt.category_id,
                    description: receipt.description.clone(),
                    amount: pending.amount,
                    received_on,
                    is_recurring: Some(false),
                    notes: None,
                };
                let created =
                    IncomeRepo::create(&mut *tx, family_id, receipt.user_id, &input).await?;
                Some(created.id)
            }
            None => None,
        };

        let update = format!(
            "UPDATE receivables SET status = $2, received_on = $3, income_id = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let received = sqlx::query_as::<_, Receivable>(&update)
            .bind(pending.id)
            .bind(STATUS_RECEIVED)
            .bind(received_on)
            .bind(income_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(received))
    }

    /// Cancel a pending receivable. Returns `None` if it is not pending.
    pub async fn cancel(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Receivable>, sqlx::Error> {
        let query = format!(
            "UPDATE receivables SET status = $3
             WHERE id = $1 AND family_id = $2 AND deleted_at IS NULL AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(id)
            .bind(family_id)
            .bind(STATUS_CANCELLED)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Pending receivables past due on `today` that have not been announced yet,
    /// across all families.
    pub async fn overdue_unnotified(
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<Vec<Receivable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM receivables
             WHERE status = $1 AND deleted_at IS NULL
               AND due_on < $2 AND overdue_notified_at IS NULL
             ORDER BY family_id, due_on"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(STATUS_PENDING)
            .bind(today)
            .fetch_all(pool)
            .await
    }

    /// Record that the overdue notification for a receivable was emitted.
    pub async fn mark_overdue_notified(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE receivables SET overdue_notified_at = NOW()
             WHERE id = $1 AND overdue_notified_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending and overdue counts and totals for a family on `today`.
    pub async fn summary(
        pool: &PgPool,
        family_id: DbId,
        today: NaiveDate,
    ) -> Result<ReceivableSummary, sqlx::Error> {
        sqlx::query_as::<_, ReceivableSummary>(
            "SELECT
                COUNT(*) AS pending_count,
                COALESCE(SUM(amount), 0) AS pending_total,
                COUNT(*) FILTER (WHERE due_on < $3) AS overdue_count,
                COALESCE(SUM(amount) FILTER (WHERE due_on < $3), 0) AS overdue_total
             FROM receivables
             WHERE family_id = $1 AND status = $2 AND deleted_at IS NULL",
        )
        .bind(family_id)
        .bind(STATUS_PENDING)
        .bind(today)
        .fetch_one(pool)
        .await
    }

    // ---- Sync ----

    /// Find a receivable by its client identifier, including deleted rows.
    pub async fn find_by_client_id(
        pool: &PgPool,
        client_id: Uuid,
    ) -> Result<Option<Receivable>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM receivables WHERE client_id = $1");
        sqlx::query_as::<_, Receivable>(&query)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// All rows (including tombstones) written after the `since` cursor, oldest write first.
    pub async fn changed_since(
        pool: &PgPool,
        family_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Vec<Receivable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM receivables
             WHERE family_id = $1 AND ($2::timestamptz IS NULL OR synced_at > $2)
             ORDER BY synced_at, id"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(family_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Insert a row pushed by a client, keeping the client's timestamps.
    pub async fn sync_insert(
        pool: &PgPool,
        family_id: DbId,
        created_by: DbId,
        input: &SyncReceivable,
    ) -> Result<Receivable, sqlx::Error> {
        let query = format!(
            "INSERT INTO receivables
                (family_id, client_id, debtor, description, amount, due_on, status,
                 received_on, created_by, updated_at, deleted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(family_id)
            .bind(input.client_id)
            .bind(input.debtor.trim())
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.due_on)
            .bind(&input.status)
            .bind(input.received_on)
            .bind(created_by)
            .bind(input.updated_at)
            .bind(input.deleted_at)
            .fetch_one(pool)
            .await
    }

    /// Overwrite an existing row with a newer client version. Moving the due
    /// date clears the overdue claim.
    pub async fn sync_apply(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &SyncReceivable,
    ) -> Result<Option<Receivable>, sqlx::Error> {
        let query = format!(
            "UPDATE receivables SET
                debtor = $3,
                description = $4,
                amount = $5,
                due_on = $6,
                overdue_notified_at = CASE
                    WHEN $6 <> due_on THEN NULL
                    ELSE overdue_notified_at
                END,
                status = $7,
                received_on = $8,
                updated_at = $9,
                deleted_at = $10
             WHERE id = $1 AND family_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Receivable>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.debtor.trim())
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.due_on)
            .bind(&input.status)
            .bind(input.received_on)
            .bind(input.updated_at)
            .bind(input.deleted_at)
            .fetch_optional(pool)
            .await
    }
}
