//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated family member from a Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.

pub mod auth;
pub mod rbac;
