//! Route definitions for the dashboard, CSV reports, and offline sync.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{dashboard, reports, sync};
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET    /    -> get_dashboard (?month=YYYY-MM&months=N)
/// ```
pub fn dashboard_router() -> Router<AppState> {
    Router::new().route("/", get(dashboard::get_dashboard))
}

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /transactions.csv    -> transactions_report (?from=&to=&kind=)
/// GET    /monthly.csv         -> monthly_report (?year=)
/// ```
pub fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/transactions.csv", get(reports::transactions_report))
        .route("/monthly.csv", get(reports::monthly_report))
}

/// Routes mounted at `/sync`.
///
/// ```text
/// GET    /pull    -> pull (?since=RFC3339)
/// POST   /push    -> push
/// ```
pub fn sync_router() -> Router<AppState> {
    Router::new()
        .route("/pull", get(sync::pull))
        .route("/push", post(sync::push))
}
