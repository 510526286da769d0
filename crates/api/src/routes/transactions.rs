//! Route definitions for incomes and expenses.

use axum::routing::get;
use axum::Router;

use crate::handlers::{expenses, incomes};
use crate::state::AppState;

/// Routes mounted at `/incomes`.
///
/// ```text
/// GET    /        -> list_incomes (?month= | ?from=&to=, ?category_id=, ?limit=&offset=)
/// POST   /        -> create_income
/// GET    /{id}    -> get_income
/// PUT    /{id}    -> update_income
/// DELETE /{id}    -> delete_income (soft)
/// ```
pub fn incomes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(incomes::list_incomes).post(incomes::create_income))
        .route(
            "/{id}",
            get(incomes::get_income)
                .put(incomes::update_income)
                .delete(incomes::delete_income),
        )
}

/// Routes mounted at `/expenses`.
///
/// ```text
/// GET    /        -> list_expenses (same filters as incomes)
/// POST   /        -> create_expense
/// GET    /{id}    -> get_expense
/// PUT    /{id}    -> update_expense
/// DELETE /{id}    -> delete_expense (soft)
/// ```
pub fn expenses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(expenses::list_expenses).post(expenses::create_expense))
        .route(
            "/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
}
