//! Repository for the `push_subscriptions` table.

use hearth_core::types::DbId;
use sqlx::PgPool;

use crate::models::push_subscription::{CreatePushSubscription, PushSubscription};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, endpoint, p256dh, auth, user_agent, created_at, last_used_at";

/// Provides operations for browser push subscriptions.
pub struct PushSubscriptionRepo;

impl PushSubscriptionRepo {
    /// Register a subscription for a user.
    ///
    /// An endpoint is unique to one browser profile; re-registering it moves
    /// it to the current user and refreshes its keys.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &CreatePushSubscription,
        user_agent: Option<&str>,
    ) -> Result<PushSubscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth, user_agent)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_push_subscriptions_endpoint DO UPDATE SET
                user_id = EXCLUDED.user_id,
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth,
                user_agent = EXCLUDED.user_agent
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PushSubscription>(&query)
            .bind(user_id)
            .bind(&input.endpoint)
            .bind(&input.keys.p256dh)
            .bind(&input.keys.auth)
            .bind(user_agent)
            .fetch_one(pool)
            .await
    }

    /// All subscriptions of a user.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PushSubscription>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM push_subscriptions WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, PushSubscription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Remove a user's subscription by endpoint. Returns `true` if removed.
    pub async fn delete_by_endpoint(
        pool: &PgPool,
        user_id: DbId,
        endpoint: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
                .bind(user_id)
                .bind(endpoint)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a subscription the push service reported as gone.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful push to a subscription.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE push_subscriptions SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
