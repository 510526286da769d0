//! Receivable lifecycle.
//!
//! A receivable is money the family expects to receive. It starts `pending`
//! and ends either `received` or `cancelled`; both end states are terminal.

use chrono::NaiveDate;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_RECEIVED: &str = "received";
pub const STATUS_CANCELLED: &str = "cancelled";

pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_RECEIVED, STATUS_CANCELLED];

/// Maximum length of the debtor name.
pub const MAX_DEBTOR_LENGTH: usize = 120;

pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid receivable status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

pub fn validate_debtor(debtor: &str) -> Result<(), String> {
    let trimmed = debtor.trim();
    if trimmed.is_empty() {
        return Err("Debtor cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_DEBTOR_LENGTH {
        return Err(format!(
            "Debtor exceeds maximum length of {MAX_DEBTOR_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Check that a receivable in `current` status may move to `target`.
///
/// Only `pending` receivables can change state.
pub fn ensure_transition(current: &str, target: &str) -> Result<(), String> {
    validate_status(target)?;
    if current != STATUS_PENDING {
        return Err(format!("Receivable is already {current}"));
    }
    if target == STATUS_PENDING {
        return Err("Receivable is already pending".to_string());
    }
    Ok(())
}

/// Check that a copy pushed by an offline client may replace the server's.
///
/// Pending receivables accept any status. Settled ones keep their status.
pub fn ensure_sync_transition(current: &str, target: &str) -> Result<(), String> {
    validate_status(target)?;
    if current == STATUS_PENDING || current == target {
        Ok(())
    } else {
        Err(format!("Receivable is already {current}"))
    }
}

/// `received_on` is set exactly when the receivable is received.
pub fn validate_received_on(status: &str, received_on: Option<NaiveDate>) -> Result<(), String> {
    match (status == STATUS_RECEIVED, received_on) {
        (true, None) => Err("received_on is required for a received receivable".to_string()),
        (false, Some(_)) => Err(format!("received_on must be empty for a {status} receivable")),
        _ => Ok(()),
    }
}

/// A pending receivable whose due date has passed is overdue.
pub fn is_overdue(status: &str, due_on: NaiveDate, today: NaiveDate) -> bool {
    status == STATUS_PENDING && due_on < today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pending_can_be_received_or_cancelled() {
        assert!(ensure_transition(STATUS_PENDING, STATUS_RECEIVED).is_ok());
        assert!(ensure_transition(STATUS_PENDING, STATUS_CANCELLED).is_ok());
    }

    #[test]
    fn terminal_states_cannot_change() {
        let err = ensure_transition(STATUS_RECEIVED, STATUS_CANCELLED).unwrap_err();
        assert_eq!(err, "Receivable is already received");
        assert!(ensure_transition(STATUS_CANCELLED, STATUS_RECEIVED).is_err());
    }

    #[test]
    fn unknown_target_is_rejected() {
        assert!(ensure_transition(STATUS_PENDING, "lost").is_err());
    }

    #[test]
    fn synced_copies_cannot_reopen_settled_receivables() {
        assert!(ensure_sync_transition(STATUS_PENDING, STATUS_PENDING).is_ok());
        assert!(ensure_sync_transition(STATUS_PENDING, STATUS_CANCELLED).is_ok());
        assert!(ensure_sync_transition(STATUS_RECEIVED, STATUS_RECEIVED).is_ok());
        let err = ensure_sync_transition(STATUS_RECEIVED, STATUS_PENDING).unwrap_err();
        assert_eq!(err, "Receivable is already received");
        assert!(ensure_sync_transition(STATUS_CANCELLED, STATUS_RECEIVED).is_err());
        assert!(ensure_sync_transition(STATUS_PENDING, "lost").is_err());
    }

    #[test]
    fn received_on_follows_status() {
        let day = date(2026, 5, 1);
        assert!(validate_received_on(STATUS_RECEIVED, Some(day)).is_ok());
        assert!(validate_received_on(STATUS_PENDING, None).is_ok());
        assert!(validate_received_on(STATUS_RECEIVED, None).is_err());
        assert!(validate_received_on(STATUS_CANCELLED, Some(day)).is_err());
    }

    #[test]
    fn overdue_only_when_pending_and_past_due() {
        let today = date(2026, 5, 10);
        assert!(is_overdue(STATUS_PENDING, date(2026, 5, 9), today));
        assert!(!is_overdue(STATUS_PENDING, date(2026, 5, 10), today));
        assert!(!is_overdue(STATUS_RECEIVED, date(2026, 1, 1), today));
    }

    #[test]
    fn debtor_rules() {
        assert!(validate_debtor("Uncle Joe").is_ok());
        assert!(validate_debtor(" ").is_err());
        assert!(validate_debtor(&"a".repeat(121)).is_err());
    }
}
