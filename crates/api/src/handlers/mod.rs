//! Request handlers, one submodule per resource.
//!
//! Handlers extract the caller with [`AuthUser`](crate::middleware::auth::AuthUser)
//! (or [`RequireAdmin`](crate::middleware::rbac::RequireAdmin)), scope every
//! repository call to the caller's family, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod family;
pub mod incomes;
pub mod investments;
pub mod notifications;
pub mod push;
pub mod receivables;
pub mod reports;
pub mod sync;
pub mod users;
