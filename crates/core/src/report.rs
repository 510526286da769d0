//! Spreadsheet (CSV) report writers.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::period::Month;
use crate::types::Money;

/// Error produced while writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),
}

/// Kind filter for the transaction report.
pub const REPORT_KIND_ALL: &str = "all";
pub const REPORT_KIND_INCOME: &str = "income";
pub const REPORT_KIND_EXPENSE: &str = "expense";

pub fn validate_report_kind(kind: &str) -> Result<(), String> {
    match kind {
        REPORT_KIND_ALL | REPORT_KIND_INCOME | REPORT_KIND_EXPENSE => Ok(()),
        other => Err(format!(
            "Invalid report kind '{other}'. Must be one of: all, income, expense"
        )),
    }
}

/// One line of the transaction report.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(serialize_with = "text_cell")]
    pub category: String,
    #[serde(serialize_with = "text_cell")]
    pub description: String,
    pub amount: Money,
    #[serde(serialize_with = "text_cell")]
    pub recorded_by: String,
}

/// Characters that make spreadsheet applications read a cell as a formula.
const FORMULA_PREFIXES: &[char] = &['=', '+', '-', '@', '\t', '\r'];

/// Prefix user-entered text with `'` when it would otherwise be evaluated as
/// a formula.
pub fn escape_formula(text: &str) -> std::borrow::Cow<'_, str> {
    if text.starts_with(FORMULA_PREFIXES) {
        format!("'{text}").into()
    } else {
        text.into()
    }
}

fn text_cell<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&escape_formula(text))
}

/// One line of the monthly summary report.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRow {
    pub month: Month,
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

/// Serialize rows into CSV bytes. A header row is always written, even when
/// `rows` is empty.
pub fn write_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Flush(e.to_string()))
}

pub const TRANSACTION_HEADERS: &[&str] =
    &["date", "type", "category", "description", "amount", "recorded_by"];

pub const MONTHLY_HEADERS: &[&str] = &["month", "income", "expense", "balance"];

pub fn transactions_csv(rows: &[TransactionRow]) -> Result<Vec<u8>, ReportError> {
    write_csv(TRANSACTION_HEADERS, rows)
}

pub fn monthly_csv(rows: &[MonthlyRow]) -> Result<Vec<u8>, ReportError> {
    write_csv(MONTHLY_HEADERS, rows)
}
