/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts are fixed-point decimals stored as `NUMERIC(14, 2)`.
pub type Money = rust_decimal::Decimal;
