//! Route definitions for the caller's family, its members, and the caller's
//! own profile.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{family, users};
use crate::state::AppState;

/// Routes mounted at `/family`.
///
/// ```text
/// GET    /   -> get_family
/// PUT    /   -> update_family (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(family::get_family).put(family::update_family))
}

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /        -> list_users
/// POST   /        -> create_user (admin only)
/// GET    /{id}    -> get_user
/// PUT    /{id}    -> update_user (admin only)
/// DELETE /{id}    -> delete_user (admin only, deactivates)
/// ```
pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

/// Routes mounted at `/me`.
///
/// ```text
/// GET    /           -> get_me
/// PUT    /           -> update_me
/// POST   /password   -> change_password
/// ```
pub fn me_router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::get_me).put(users::update_me))
        .route("/password", post(users::change_password))
}
