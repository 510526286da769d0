//! Route definitions for in-app notifications and Web Push registration.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{notifications, push};
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                -> list_notifications (?unread_only=&limit=&offset=)
/// GET    /unread-count    -> unread_count
/// POST   /read-all        -> mark_all_read
/// POST   /{id}/read       -> mark_read
/// DELETE /{id}            -> delete_notification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", post(notifications::mark_all_read))
        .route("/{id}/read", post(notifications::mark_read))
        .route("/{id}", delete(notifications::delete_notification))
}

/// Routes mounted at `/push`.
///
/// ```text
/// GET    /public-key       -> public_key
/// POST   /subscriptions    -> subscribe
/// DELETE /subscriptions    -> unsubscribe
/// ```
pub fn push_router() -> Router<AppState> {
    Router::new()
        .route("/public-key", get(push::public_key))
        .route(
            "/subscriptions",
            post(push::subscribe).delete(push::unsubscribe),
        )
}
