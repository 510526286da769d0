//! Investment kinds and return computation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::Money;

pub const VALID_KINDS: &[&str] = &[
    "savings",
    "stocks",
    "bonds",
    "funds",
    "crypto",
    "real_estate",
    "pension",
    "other",
];

pub fn validate_kind(kind: &str) -> Result<(), String> {
    if VALID_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(format!(
            "Invalid investment kind '{kind}'. Must be one of: {}",
            VALID_KINDS.join(", ")
        ))
    }
}

/// Gain or loss of a position (or a set of positions).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentReturn {
    pub invested: Money,
    pub current: Money,
    pub gain: Money,
    /// Percentage gain relative to the invested amount, two decimal places.
    /// `None` when nothing was invested.
    pub gain_pct: Option<Decimal>,
}

impl InvestmentReturn {
    pub fn compute(invested: Money, current: Money) -> Self {
        let gain = current - invested;
        let gain_pct = if invested.is_zero() {
            None
        } else {
            Some((gain * Decimal::from(100) / invested).round_dp(2))
        };
        Self {
            invested,
            current,
            gain,
            gain_pct,
        }
    }
}

/// Portfolio totals with a per-kind breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total: InvestmentReturn,
    pub by_kind: BTreeMap<String, InvestmentReturn>,
    pub positions: usize,
}

/// Summarize `(kind, invested, current)` positions.
pub fn summarize<'a, I>(positions: I) -> PortfolioSummary
where
    I: IntoIterator<Item = (&'a str, Money, Money)>,
{
    let mut totals: BTreeMap<String, (Money, Money)> = BTreeMap::new();
    let mut invested = Decimal::ZERO;
    let mut current = Decimal::ZERO;
    let mut count = 0;

    for (kind, inv, cur) in positions {
        let entry = totals
            .entry(kind.to_string())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += inv;
        entry.1 += cur;
        invested += inv;
        current += cur;
        count += 1;
    }

    PortfolioSummary {
        total: InvestmentReturn::compute(invested, current),
        by_kind: totals
            .into_iter()
            .map(|(k, (inv, cur))| (k, InvestmentReturn::compute(inv, cur)))
            .collect(),
        positions: count,
    }
}
