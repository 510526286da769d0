pub mod auth;
pub mod budgets;
pub mod categories;
pub mod family;
pub mod health;
pub mod insights;
pub mod investments;
pub mod notifications;
pub mod receivables;
pub mod transactions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register, /auth/login, /auth/refresh        public
/// /auth/logout                                      requires auth
///
/// /family                                           get, update (admin)
/// /users, /users/{id}                               members (writes admin only)
/// /me, /me/password                                 own profile
///
/// /categories, /categories/{id}                     CRUD
/// /incomes, /incomes/{id}                           CRUD, soft delete
/// /expenses, /expenses/{id}                         CRUD, soft delete, budget alerts
/// /budgets, /budgets/{id}, /budgets/copy            CRUD, copy month
/// /receivables, /receivables/{id}                   CRUD, soft delete
/// /receivables/{id}/receive, /{id}/cancel           lifecycle
/// /investments, /investments/{id}                   CRUD with returns
/// /investments/summary                              portfolio totals
///
/// /notifications, /notifications/unread-count       in-app inbox
/// /notifications/read-all, /{id}/read, /{id}        inbox actions
/// /push/public-key, /push/subscriptions             Web Push registration
///
/// /dashboard                                        monthly overview
/// /reports/transactions.csv, /reports/monthly.csv   CSV downloads
/// /sync/pull, /sync/push                            offline sync
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/family", family::router())
        .nest("/users", family::users_router())
        .nest("/me", family::me_router())
        .nest("/categories", categories::router())
        .nest("/incomes", transactions::incomes_router())
        .nest("/expenses", transactions::expenses_router())
        .nest("/budgets", budgets::router())
        .nest("/receivables", receivables::router())
        .nest("/investments", investments::router())
        .nest("/notifications", notifications::router())
        .nest("/push", notifications::push_router())
        .nest("/dashboard", insights::dashboard_router())
        .nest("/reports", insights::reports_router())
        .nest("/sync", insights::sync_router())
}
