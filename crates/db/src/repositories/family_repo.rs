//! Repository for the `families` table.

use hearth_core::roles::ROLE_ADMIN;
use hearth_core::types::DbId;
use sqlx::PgPool;

use crate::models::family::{CreateFamily, Family, UpdateFamily};
use crate::models::user::{CreateUser, User};
use crate::repositories::{CategoryRepo, UserRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, currency, created_at, updated_at";

/// First administrator of a newly registered family.
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Provides CRUD operations for families.
pub struct FamilyRepo;

impl FamilyRepo {
    /// Register a family with its first admin and the default categories.
    ///
    /// Runs in a single transaction: either everything is created or nothing is.
    pub async fn create_with_admin(
        pool: &PgPool,
        family: &CreateFamily,
        admin: &NewAdmin,
    ) -> Result<(Family, User), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO families (name, currency) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Family>(&query)
            .bind(&family.name)
            .bind(&family.currency)
            .fetch_one(&mut *tx)
            .await?;

        let user_input = CreateUser {
            family_id: created.id,
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
            role: ROLE_ADMIN.to_string(),
        };
        let user = UserRepo::create(&mut *tx, &user_input).await?;

        CategoryRepo::seed_defaults(&mut tx, created.id).await?;

        tx.commit().await?;
        Ok((created, user))
    }

    /// Find a family by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Family>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM families WHERE id = $1");
        sqlx::query_as::<_, Family>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a family. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFamily,
    ) -> Result<Option<Family>, sqlx::Error> {
        let query = format!(
            "UPDATE families SET
                name = COALESCE($2, name),
                currency = COALESCE($3, currency)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.currency)
            .fetch_optional(pool)
            .await
    }
}
