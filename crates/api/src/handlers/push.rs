//! Handlers for Web Push registration.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use hearth_core::types::DbId;
use hearth_db::models::push_subscription::{CreatePushSubscription, PushSubscription};
use hearth_db::repositories::PushSubscriptionRepo;
use hearth_events::push::endpoint_origin;
use serde::{Deserialize, Serialize};

use crate::error::{invalid, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest key material accepted from a browser subscription.
const MAX_KEY_LENGTH: usize = 256;

#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
}

/// Request body for `DELETE /push/subscriptions`.
#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// The stored subscription without its key material.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub id: DbId,
    pub endpoint: String,
    pub created_at: hearth_core::types::Timestamp,
}

impl From<PushSubscription> for SubscriptionView {
    fn from(sub: PushSubscription) -> Self {
        Self {
            id: sub.id,
            endpoint: sub.endpoint,
            created_at: sub.created_at,
        }
    }
}

/// GET /api/v1/push/public-key
///
/// The VAPID application server key clients pass to `pushManager.subscribe`.
/// 404 when push is not configured.
pub async fn public_key(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PublicKeyResponse>>> {
    let vapid = state
        .config
        .vapid
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Web Push is not enabled".into()))?;
    Ok(Json(DataResponse {
        data: PublicKeyResponse {
            public_key: vapid.public_key.clone(),
        },
    }))
}

/// POST /api/v1/push/subscriptions
///
/// Register (or refresh) the caller's browser subscription. Re-subscribing
/// with a known endpoint moves it to the caller and replaces its keys.
pub async fn subscribe(
    auth: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreatePushSubscription>,
) -> AppResult<(StatusCode, Json<DataResponse<SubscriptionView>>)> {
    endpoint_origin(&input.endpoint).map_err(|e| invalid(e.to_string()))?;
    for (name, value) in [("p256dh", &input.keys.p256dh), ("auth", &input.keys.auth)] {
        if value.is_empty() || value.len() > MAX_KEY_LENGTH {
            return Err(invalid(format!("Subscription key '{name}' is invalid")));
        }
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    let subscription =
        PushSubscriptionRepo::upsert(&state.pool, auth.user_id, &input, user_agent).await?;

    tracing::debug!(
        user_id = auth.user_id,
        subscription_id = subscription.id,
        "Push subscription saved"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: subscription.into(),
        }),
    ))
}

/// DELETE /api/v1/push/subscriptions
pub async fn unsubscribe(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UnsubscribeRequest>,
) -> AppResult<StatusCode> {
    if PushSubscriptionRepo::delete_by_endpoint(&state.pool, auth.user_id, &input.endpoint).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Push subscription not found".into()))
    }
}
