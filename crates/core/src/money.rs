//! Monetary amount rules.
//!
//! Amounts are stored as `NUMERIC(14, 2)`; every amount entered by a user
//! must be strictly positive and representable in that column.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::Money;

/// Maximum number of fractional digits for an amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount representable in a `NUMERIC(14, 2)` column.
pub fn max_amount() -> Money {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// Validate a user-entered amount: positive, at most two decimal places,
/// and no larger than [`max_amount`].
pub fn validate_amount(amount: Money) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than zero".to_string());
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(format!(
            "Amount must have at most {MONEY_SCALE} decimal places"
        ));
    }
    if amount > max_amount() {
        return Err(format!("Amount must not exceed {}", max_amount()));
    }
    Ok(())
}

/// Validate an amount that may legitimately be zero (e.g. the current value
/// of an investment that lost everything).
pub fn validate_non_negative_amount(amount: Money) -> Result<(), String> {
    if amount.is_zero() {
        return Ok(());
    }
    if amount < Decimal::ZERO {
        return Err("Amount must not be negative".to_string());
    }
    validate_amount(amount)
}

/// Round to cents, midpoint away from zero.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate an ISO-4217 style currency code (three uppercase ASCII letters).
pub fn validate_currency(code: &str) -> Result<(), String> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(format!(
            "Invalid currency '{code}'. Expected three uppercase letters, e.g. USD"
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Money {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn positive_amount_with_cents_is_valid() {
        assert!(validate_amount(dec("120.50")).is_ok());
        assert!(validate_amount(dec("0.01")).is_ok());
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert!(validate_amount(dec("10.500")).is_ok());
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(dec("-5")).is_err());
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        let err = validate_amount(dec("1.005")).unwrap_err();
        assert!(err.contains("decimal places"));
    }

    #[test]
    fn amount_above_column_capacity_is_rejected() {
        assert!(validate_amount(dec("999999999999.99")).is_ok());
        assert!(validate_amount(dec("1000000000000.00")).is_err());
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(dec("-0.01")).is_err());
    }

    #[test]
    fn round_money_rounds_half_away_from_zero() {
        assert_eq!(round_money(dec("2.345")), dec("2.35"));
        assert_eq!(round_money(dec("-2.345")), dec("-2.35"));
    }

    #[test]
    fn currency_codes() {
        assert!(validate_currency("BRL").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("EURO").is_err());
    }
}
