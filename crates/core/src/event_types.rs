//! Domain event names and who gets notified about them.

pub const INCOME_CREATED: &str = "income.created";
pub const EXPENSE_CREATED: &str = "expense.created";
pub const BUDGET_WARNING: &str = "budget.warning";
pub const BUDGET_EXCEEDED: &str = "budget.exceeded";
pub const RECEIVABLE_RECEIVED: &str = "receivable.received";
pub const RECEIVABLE_OVERDUE: &str = "receivable.overdue";
pub const MEMBER_ADDED: &str = "member.added";

pub const ALL_EVENT_TYPES: &[&str] = &[
    INCOME_CREATED,
    EXPENSE_CREATED,
    BUDGET_WARNING,
    BUDGET_EXCEEDED,
    RECEIVABLE_RECEIVED,
    RECEIVABLE_OVERDUE,
    MEMBER_ADDED,
];

/// Recipients of an event within the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every active member except the one who caused the event.
    OthersInFamily,
    /// Every active member, including the actor.
    WholeFamily,
}

/// Alerts reach everyone; activity is only interesting to the other members.
pub fn audience_for(event_type: &str) -> Audience {
    match event_type {
        BUDGET_WARNING | BUDGET_EXCEEDED | RECEIVABLE_OVERDUE => Audience::WholeFamily,
        _ => Audience::OthersInFamily,
    }
}
