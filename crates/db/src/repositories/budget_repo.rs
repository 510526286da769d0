//! Repository for the `budgets` table.

use chrono::NaiveDate;
use hearth_core::budget::DEFAULT_ALERT_THRESHOLD_PCT;
use hearth_core::types::DbId;
use sqlx::PgPool;

use crate::models::budget::{Budget, BudgetWithSpending, CreateBudget, UpdateBudget};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, family_id, category_id, month, amount_limit, alert_threshold_pct, \
                        created_at, updated_at";

/// Provides CRUD operations for monthly category budgets.
pub struct BudgetRepo;

impl BudgetRepo {
    /// Insert a new budget, returning the created row.
    pub async fn create(
        pool: &PgPool,
        family_id: DbId,
        input: &CreateBudget,
    ) -> Result<Budget, sqlx::Error> {
        let query = format!(
            "INSERT INTO budgets (family_id, category_id, month, amount_limit, alert_threshold_pct)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Budget>(&query)
            .bind(family_id)
            .bind(input.category_id)
            .bind(input.month.first_day())
            .bind(input.amount_limit)
            .bind(input.alert_threshold_pct.unwrap_or(DEFAULT_ALERT_THRESHOLD_PCT))
            .fetch_one(pool)
            .await
    }

    /// Find a budget by ID within a family.
    pub async fn find_by_id(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM budgets WHERE id = $1 AND family_id = $2");
        sqlx::query_as::<_, Budget>(&query)
            .bind(id)
            .bind(family_id)
            .fetch_optional(pool)
            .await
    }

    /// The budget for a category in the month starting at `month`, if one exists.
    pub async fn find_for_category(
        pool: &PgPool,
        family_id: DbId,
        category_id: DbId,
        month: NaiveDate,
    ) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM budgets
             WHERE family_id = $1 AND category_id = $2 AND month = $3"
        );
        sqlx::query_as::<_, Budget>(&query)
            .bind(family_id)
            .bind(category_id)
            .bind(month)
            .fetch_optional(pool)
            .await
    }

    /// List a month's budgets with the category name and live spending.
    pub async fn list_with_spending(
        pool: &PgPool,
        family_id: DbId,
        month: NaiveDate,
    ) -> Result<Vec<BudgetWithSpending>, sqlx::Error> {
        sqlx::query_as::<_, BudgetWithSpending>(
            "SELECT b.id, b.family_id, b.category_id, b.month, b.amount_limit,
                    b.alert_threshold_pct, b.created_at, b.updated_at,
                    c.name AS category_name,
                    COALESCE((
                        SELECT SUM(e.amount) FROM expenses e
                        WHERE e.family_id = b.family_id
                          AND e.category_id = b.category_id
                          AND e.deleted_at IS NULL
                          AND e.spent_on >= b.month
                          AND e.spent_on < (b.month + INTERVAL '1 month')::date
                    ), 0) AS spent
             FROM budgets b
             JOIN categories c ON c.id = b.category_id
             WHERE b.family_id = $1 AND b.month = $2
             ORDER BY c.name",
        )
        .bind(family_id)
        .bind(month)
        .fetch_all(pool)
        .await
    }

    /// Update a budget. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &UpdateBudget,
    ) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!(
            "UPDATE budgets SET
                amount_limit = COALESCE($3, amount_limit),
                alert_threshold_pct = COALESCE($4, alert_threshold_pct)
             WHERE id = $1 AND family_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Budget>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.amount_limit)
            .bind(input.alert_threshold_pct)
            .fetch_optional(pool)
            .await
    }

    /// Delete a budget. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, family_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND family_id = $2")
            .bind(id)
            .bind(family_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Copy every budget of month `from` into month `to`, skipping categories
    /// that already have a budget in `to`. Returns the number of rows copied.
    pub async fn copy_month(
        pool: &PgPool,
        family_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO budgets (family_id, category_id, month, amount_limit, alert_threshold_pct)
             SELECT family_id, category_id, $3, amount_limit, alert_threshold_pct
             FROM budgets
             WHERE family_id = $1 AND month = $2
             ON CONFLICT ON CONSTRAINT uq_budgets_family_category_month DO NOTHING",
        )
        .bind(family_id)
        .bind(from)
        .bind(to)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
