//! Shared response envelope types for API handlers.
//!
//! All API responses except auth tokens use a `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A page of items together with the sum of the filtered amounts.
#[derive(Debug, Serialize)]
pub struct ListWithTotal<T: Serialize> {
    pub items: Vec<T>,
    pub total: rust_decimal::Decimal,
    pub limit: i64,
    pub offset: i64,
}
