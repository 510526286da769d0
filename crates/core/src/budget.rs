//! Budget evaluation.
//!
//! A budget caps spending for one expense category in one month. Alerts fire
//! only when a write moves spending across the warning threshold or across
//! the limit, so repeated expenses in an already-exceeded month stay quiet.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::round_money;
use crate::types::Money;

/// Default warning threshold, as a percentage of the limit.
pub const DEFAULT_ALERT_THRESHOLD_PCT: i32 = 80;

/// Spending state of a budget, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    Under,
    Warning,
    Exceeded,
}

/// Alert raised when spending crosses into a more severe state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetAlert {
    Warning,
    Exceeded,
}

impl BudgetAlert {
    pub fn event_type(&self) -> &'static str {
        match self {
            BudgetAlert::Warning => crate::event_types::BUDGET_WARNING,
            BudgetAlert::Exceeded => crate::event_types::BUDGET_EXCEEDED,
        }
    }
}

/// Computed progress of a budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub limit: Money,
    pub spent: Money,
    pub remaining: Money,
    pub percent_used: Decimal,
    pub state: BudgetState,
}

pub fn validate_threshold(threshold_pct: i32) -> Result<(), String> {
    if (1..=100).contains(&threshold_pct) {
        Ok(())
    } else {
        Err("Alert threshold must be between 1 and 100 percent".to_string())
    }
}

fn state_for(limit: Money, spent: Money, threshold_pct: i32) -> BudgetState {
    if spent > limit {
        BudgetState::Exceeded
    } else if spent * Decimal::from(100) >= limit * Decimal::from(threshold_pct) {
        BudgetState::Warning
    } else {
        BudgetState::Under
    }
}

/// Evaluate spending against a budget limit.
pub fn evaluate(limit: Money, spent: Money, threshold_pct: i32) -> BudgetStatus {
    let percent_used = if limit.is_zero() {
        Decimal::ZERO
    } else {
        (spent * Decimal::from(100) / limit).round_dp(1)
    };
    BudgetStatus {
        limit,
        spent,
        remaining: round_money(limit - spent),
        percent_used,
        state: state_for(limit, spent, threshold_pct),
    }
}

/// Return the alert to raise when spending moves from `before` to `after`.
pub fn crossing(
    limit: Money,
    before: Money,
    after: Money,
    threshold_pct: i32,
) -> Option<BudgetAlert> {
    let old = state_for(limit, before, threshold_pct);
    let new = state_for(limit, after, threshold_pct);
    if new <= old {
        return None;
    }
    match new {
        BudgetState::Exceeded => Some(BudgetAlert::Exceeded),
        BudgetState::Warning => Some(BudgetAlert::Warning),
        BudgetState::Under => None,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_matches::assert_matches;

    use super::*;

    fn dec(s: &str) -> Money {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn evaluate_under_budget() {
        let status = evaluate(dec("500"), dec("100"), 80);
        assert_eq!(status.state, BudgetState::Under);
        assert_eq!(status.remaining, dec("400"));
        assert_eq!(status.percent_used, dec("20.0"));
    }

    #[test]
    fn evaluate_warning_at_threshold() {
        let status = evaluate(dec("500"), dec("400"), 80);
        assert_eq!(status.state, BudgetState::Warning);
    }

    #[test]
    fn spending_exactly_the_limit_is_not_exceeded() {
        let status = evaluate(dec("500"), dec("500"), 80);
        assert_eq!(status.state, BudgetState::Warning);
        assert!(status.remaining.is_zero());
    }

    #[test]
    fn evaluate_exceeded_has_negative_remaining() {
        let status = evaluate(dec("500"), dec("612.30"), 80);
        assert_eq!(status.state, BudgetState::Exceeded);
        assert_eq!(status.remaining, dec("-112.30"));
        assert_eq!(status.percent_used, dec("122.5"));
    }

    #[test]
    fn crossing_into_warning() {
        let alert = crossing(dec("100"), dec("50"), dec("85"), 80);
        assert_matches!(alert, Some(BudgetAlert::Warning));
    }

    #[test]
    fn jumping_straight_past_limit_reports_exceeded() {
        let alert = crossing(dec("100"), dec("10"), dec("150"), 80);
        assert_matches!(alert, Some(BudgetAlert::Exceeded));
    }

    #[test]
    fn no_repeat_alert_within_same_state() {
        assert_eq!(crossing(dec("100"), dec("120"), dec("140"), 80), None);
        assert_eq!(crossing(dec("100"), dec("85"), dec("90"), 80), None);
        assert_eq!(crossing(dec("100"), dec("10"), dec("20"), 80), None);
    }

    #[test]
    fn spending_decrease_never_alerts() {
        assert_eq!(crossing(dec("100"), dec("150"), dec("50"), 80), None);
    }

    #[test]
    fn threshold_bounds() {
        assert!(validate_threshold(1).is_ok());
        assert!(validate_threshold(100).is_ok());
        assert!(validate_threshold(0).is_err());
        assert!(validate_threshold(101).is_err());
    }

    #[test]
    fn alert_event_types() {
        assert_eq!(BudgetAlert::Warning.event_type(), "budget.warning");
        assert_eq!(BudgetAlert::Exceeded.event_type(), "budget.exceeded");
    }
}
