//! Route definitions for the `/receivables` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::receivables;
use crate::state::AppState;

/// Routes mounted at `/receivables`.
///
/// ```text
/// GET    /                -> list_receivables (?status=)
/// POST   /                -> create_receivable
/// GET    /{id}            -> get_receivable
/// PUT    /{id}            -> update_receivable (pending only)
/// DELETE /{id}            -> delete_receivable (soft)
/// POST   /{id}/receive    -> receive_receivable
/// POST   /{id}/cancel     -> cancel_receivable
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(receivables::list_receivables).post(receivables::create_receivable),
        )
        .route(
            "/{id}",
            get(receivables::get_receivable)
                .put(receivables::update_receivable)
                .delete(receivables::delete_receivable),
        )
        .route("/{id}/receive", post(receivables::receive_receivable))
        .route("/{id}/cancel", post(receivables::cancel_receivable))
}
