//! Aggregate queries backing the dashboard and CSV reports.

use chrono::NaiveDate;
use hearth_core::category::{KIND_EXPENSE, KIND_INCOME};
use hearth_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{CategoryTotal, MonthlyTotal, TransactionLine};

/// Income half of the transaction feed. Binds `$1` family, `$2` from, `$3` to.
const INCOME_LINES: &str = "SELECT i.id, 'income'::text AS kind, i.description, i.amount,
                i.received_on AS occurred_on, c.name AS category_name, u.name AS recorded_by
         FROM incomes i
         LEFT JOIN categories c ON c.id = i.category_id
         LEFT JOIN users u ON u.id = i.user_id
         WHERE i.family_id = $1 AND i.deleted_at IS NULL
           AND ($2::date IS NULL OR i.received_on >= $2)
           AND ($3::date IS NULL OR i.received_on <= $3)";

/// Expense half of the transaction feed. Same binds as [`INCOME_LINES`].
const EXPENSE_LINES: &str = "SELECT e.id, 'expense'::text AS kind, e.description, e.amount,
                e.spent_on AS occurred_on, c.name AS category_name, u.name AS recorded_by
         FROM expenses e
         LEFT JOIN categories c ON c.id = e.category_id
         LEFT JOIN users u ON u.id = e.user_id
         WHERE e.family_id = $1 AND e.deleted_at IS NULL
           AND ($2::date IS NULL OR e.spent_on >= $2)
           AND ($3::date IS NULL OR e.spent_on <= $3)";

/// Read-only aggregates across incomes and expenses.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Expense totals per category between two dates (inclusive).
    pub async fn expense_by_category(
        pool: &PgPool,
        family_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, sqlx::Error> {
        sqlx::query_as::<_, CategoryTotal>(
            "SELECT e.category_id, c.name AS category_name, SUM(e.amount) AS total
             FROM expenses e
             LEFT JOIN categories c ON c.id = e.category_id
             WHERE e.family_id = $1 AND e.deleted_at IS NULL
               AND e.spent_on BETWEEN $2 AND $3
             GROUP BY e.category_id, c.name",
        )
        .bind(family_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Income totals per category between two dates (inclusive).
    pub async fn income_by_category(
        pool: &PgPool,
        family_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, sqlx::Error> {
        sqlx::query_as::<_, CategoryTotal>(
            "SELECT i.category_id, c.name AS category_name, SUM(i.amount) AS total
             FROM incomes i
             LEFT JOIN categories c ON c.id = i.category_id
             WHERE i.family_id = $1 AND i.deleted_at IS NULL
               AND i.received_on BETWEEN $2 AND $3
             GROUP BY i.category_id, c.name",
        )
        .bind(family_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Income per month between two dates. Months without income are absent.
    pub async fn monthly_income(
        pool: &PgPool,
        family_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlyTotal>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyTotal>(
            "SELECT date_trunc('month', received_on)::date AS month, SUM(amount) AS total
             FROM incomes
             WHERE family_id = $1 AND deleted_at IS NULL
               AND received_on BETWEEN $2 AND $3
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(family_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Expenses per month between two dates. Months without spending are absent.
    pub async fn monthly_expense(
        pool: &PgPool,
        family_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlyTotal>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyTotal>(
            "SELECT date_trunc('month', spent_on)::date AS month, SUM(amount) AS total
             FROM expenses
             WHERE family_id = $1 AND deleted_at IS NULL
               AND spent_on BETWEEN $2 AND $3
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(family_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// The most recent incomes and expenses, newest first.
    pub async fn recent_transactions(
        pool: &PgPool,
        family_id: DbId,
        limit: i64,
    ) -> Result<Vec<TransactionLine>, sqlx::Error> {
        let query = format!(
            "{INCOME_LINES}
             UNION ALL
             {EXPENSE_LINES}
             ORDER BY occurred_on DESC, kind, id DESC
             LIMIT $4"
        );
        sqlx::query_as::<_, TransactionLine>(&query)
            .bind(family_id)
            .bind(None::<NaiveDate>)
            .bind(None::<NaiveDate>)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every transaction of the given kind (`income`, `expense`, or both when
    /// `None`) between two dates, in chronological order.
    pub async fn transactions_between(
        pool: &PgPool,
        family_id: DbId,
        from: NaiveDate,
        to: NaiveDate,
        kind: Option<&str>,
    ) -> Result<Vec<TransactionLine>, sqlx::Error> {
        let body = match kind {
            Some(k) if k == KIND_INCOME => INCOME_LINES.to_string(),
            Some(k) if k == KIND_EXPENSE => EXPENSE_LINES.to_string(),
            _ => format!("{INCOME_LINES} UNION ALL {EXPENSE_LINES}"),
        };
        let query = format!("{body} ORDER BY occurred_on, kind, id");
        sqlx::query_as::<_, TransactionLine>(&query)
            .bind(family_id)
            .bind(Some(from))
            .bind(Some(to))
            .fetch_all(pool)
            .await
    }
}
