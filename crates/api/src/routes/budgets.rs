//! Route definitions for the `/budgets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::budgets;
use crate::state::AppState;

/// Routes mounted at `/budgets`.
///
/// ```text
/// GET    /        -> list_budgets (?month=YYYY-MM)
/// POST   /        -> create_budget
/// POST   /copy    -> copy_budgets
/// GET    /{id}    -> get_budget
/// PUT    /{id}    -> update_budget
/// DELETE /{id}    -> delete_budget
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(budgets::list_budgets).post(budgets::create_budget))
        .route("/copy", post(budgets::copy_budgets))
        .route(
            "/{id}",
            get(budgets::get_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
}
