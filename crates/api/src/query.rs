//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use hearth_core::error::CoreError;
use hearth_core::period::{DateRange, Month};
use hearth_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `clamp_limit` / `clamp_offset` before use.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?month=YYYY-MM`, defaulting to the current month.
#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub month: Option<Month>,
}

impl MonthParams {
    pub fn month_or_current(&self) -> Month {
        self.month
            .unwrap_or_else(|| Month::of(chrono::Utc::now().date_naive()))
    }
}

/// Filters shared by the income and expense listings.
///
/// `month` and `from`/`to` are mutually exclusive.
#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub month: Option<Month>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TransactionListParams {
    /// Resolve the date window. Both bounds are optional when no month is given.
    pub fn window(&self) -> AppResult<(Option<NaiveDate>, Option<NaiveDate>)> {
        if let Some(month) = self.month {
            if self.from.is_some() || self.to.is_some() {
                return Err(AppError::Core(CoreError::Validation(
                    "Use either month or from/to, not both".into(),
                )));
            }
            return Ok((Some(month.first_day()), Some(month.last_day())));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            DateRange::new(from, to).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
        }
        Ok((self.from, self.to))
    }
}
