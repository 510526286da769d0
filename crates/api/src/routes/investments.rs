//! Route definitions for the `/investments` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::investments;
use crate::state::AppState;

/// Routes mounted at `/investments`.
///
/// ```text
/// GET    /           -> list_investments
/// POST   /           -> create_investment
/// GET    /summary    -> investment_summary
/// GET    /{id}       -> get_investment
/// PUT    /{id}       -> update_investment
/// DELETE /{id}       -> delete_investment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(investments::list_investments).post(investments::create_investment),
        )
        .route("/summary", get(investments::investment_summary))
        .route(
            "/{id}",
            get(investments::get_investment)
                .put(investments::update_investment)
                .delete(investments::delete_investment),
        )
}
