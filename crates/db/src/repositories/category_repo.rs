//! Repository for the `categories` table.

use hearth_core::category::DEFAULT_CATEGORIES;
use hearth_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::category::{Category, CreateCategory, UpdateCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, family_id, name, kind, color, created_at, updated_at";

/// Provides CRUD operations for income/expense categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(
        pool: &PgPool,
        family_id: DbId,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (family_id, name, kind, color)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(family_id)
            .bind(input.name.trim())
            .bind(&input.kind)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Insert the default category set for a new family.
    pub async fn seed_defaults(
        conn: &mut PgConnection,
        family_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let kinds: Vec<String> = DEFAULT_CATEGORIES.iter().map(|(k, _)| k.to_string()).collect();
        let names: Vec<String> = DEFAULT_CATEGORIES.iter().map(|(_, n)| n.to_string()).collect();
        let result = sqlx::query(
            "INSERT INTO categories (family_id, kind, name)
             SELECT $1, k, n FROM UNNEST($2::text[], $3::text[]) AS t(k, n)",
        )
        .bind(family_id)
        .bind(&kinds)
        .bind(&names)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find a category by ID within a family.
    pub async fn find_by_id(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND family_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(family_id)
            .fetch_optional(pool)
            .await
    }

    /// List a family's categories, optionally restricted to one kind.
    pub async fn list(
        pool: &PgPool,
        family_id: DbId,
        kind: Option<&str>,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE family_id = $1 AND ($2::text IS NULL OR kind = $2)
             ORDER BY kind, name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(family_id)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    /// Update a category. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        family_id: DbId,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($3, name),
                color = COALESCE($4, color)
             WHERE id = $1 AND family_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(family_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Transactions keep their rows with a `NULL` category;
    /// budgets for the category are removed by the foreign key cascade.
    pub async fn delete(pool: &PgPool, family_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND family_id = $2")
            .bind(id)
            .bind(family_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
