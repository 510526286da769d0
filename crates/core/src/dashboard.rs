//! Dashboard aggregation helpers.
//!
//! The database does the summing; these functions shape the sums into what
//! the dashboard renders (zero-filled trends, category shares, rates).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::period::Month;
use crate::types::{DbId, Money};

/// Label used for transactions without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Income/expense totals for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
    /// Share of income left after expenses, in percent with one decimal.
    pub savings_rate: Option<Decimal>,
}

impl MonthTotals {
    pub fn new(income: Money, expense: Money) -> Self {
        let balance = income - expense;
        let savings_rate = if income > Decimal::ZERO {
            Some((balance * Decimal::from(100) / income).round_dp(1))
        } else {
            None
        };
        Self {
            income,
            expense,
            balance,
            savings_rate,
        }
    }
}

/// One point in the monthly trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: Month,
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

/// Build a trend over `months`, filling months without data with zeros.
///
/// `incomes` and `expenses` are per-month sums as returned by the database;
/// months outside `months` are ignored.
pub fn fill_trend(
    months: &[Month],
    incomes: &[(Month, Money)],
    expenses: &[(Month, Money)],
) -> Vec<TrendPoint> {
    let income_by_month: HashMap<Month, Money> = incomes.iter().copied().collect();
    let expense_by_month: HashMap<Month, Money> = expenses.iter().copied().collect();

    months
        .iter()
        .map(|m| {
            let income = income_by_month.get(m).copied().unwrap_or(Decimal::ZERO);
            let expense = expense_by_month.get(m).copied().unwrap_or(Decimal::ZERO);
            TrendPoint {
                month: *m,
                income,
                expense,
                balance: income - expense,
            }
        })
        .collect()
}

/// A category's share of a month's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category_id: Option<DbId>,
    pub name: String,
    pub amount: Money,
    pub percent: Decimal,
    /// Budget limit for the category in the month, when one exists.
    pub budget_limit: Option<Money>,
}

/// Turn per-category sums into shares sorted by amount (desc), then name.
pub fn category_shares(rows: Vec<(Option<DbId>, Option<String>, Money)>) -> Vec<CategoryShare> {
    let total: Money = rows.iter().map(|(_, _, amount)| *amount).sum();

    let mut shares: Vec<CategoryShare> = rows
        .into_iter()
        .map(|(category_id, name, amount)| CategoryShare {
            category_id,
            name: name.unwrap_or_else(|| UNCATEGORIZED.to_string()),
            amount,
            percent: if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount * Decimal::from(100) / total).round_dp(1)
            },
            budget_limit: None,
        })
        .collect();

    shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    shares
}
