//! PostgreSQL access layer: connection pool, migrations, row models, and
//! repositories.

pub mod models;
pub mod repositories;

use hearth_core::types::Timestamp;
use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Cursor handed to offline clients after a pull.
///
/// Every write stamps `synced_at` from the database clock, so the cursor comes
/// from the same clock. It is held back to the start of the oldest open
/// transaction, whose rows may still commit with an earlier `synced_at`.
pub async fn sync_cursor(pool: &DbPool) -> Result<Timestamp, sqlx::Error> {
    sqlx::query_scalar::<_, Timestamp>(
        "SELECT LEAST(clock_timestamp(), MIN(xact_start))
         FROM pg_stat_activity
         WHERE datname = current_database() AND backend_type = 'client backend'",
    )
    .fetch_one(pool)
    .await
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
