//! Human-readable title and body for each event type.

use hearth_core::event_types::{
    BUDGET_EXCEEDED, BUDGET_WARNING, EXPENSE_CREATED, INCOME_CREATED, MEMBER_ADDED,
    RECEIVABLE_OVERDUE, RECEIVABLE_RECEIVED,
};
use hearth_events::{FinanceEvent, Urgency};
use serde_json::Value;

/// Stand-in for an actor whose name could not be resolved.
const UNKNOWN_ACTOR: &str = "Someone";

/// A rendered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub title: String,
    pub body: String,
    /// Client route the notification opens.
    pub link: Option<String>,
    pub urgency: Urgency,
}

/// Render `event` for display. Returns `None` for event types that do not
/// produce notifications.
pub fn render(event: &FinanceEvent, actor_name: Option<&str>) -> Option<Rendered> {
    let p = &event.payload;
    let actor = actor_name.unwrap_or(UNKNOWN_ACTOR);

    let rendered = match event.event_type.as_str() {
        INCOME_CREATED => Rendered {
            title: "New income".into(),
            body: format!(
                "{actor} recorded {} of {}{}",
                text(p, "description"),
                text(p, "amount"),
                in_category(p)
            ),
            link: Some("/incomes".into()),
            urgency: Urgency::Low,
        },
        EXPENSE_CREATED => Rendered {
            title: "New expense".into(),
            body: format!(
                "{actor} spent {} on {}{}",
                text(p, "amount"),
                text(p, "description"),
                in_category(p)
            ),
            link: Some("/expenses".into()),
            urgency: Urgency::Low,
        },
        BUDGET_WARNING => Rendered {
            title: format!("Budget warning: {}", text(p, "category")),
            body: format!(
                "{}% of the {} budget used ({} of {})",
                text(p, "percent_used"),
                text(p, "month"),
                text(p, "spent"),
                text(p, "limit")
            ),
            link: Some(format!("/budgets?month={}", text(p, "month"))),
            urgency: Urgency::Normal,
        },
        BUDGET_EXCEEDED => Rendered {
            title: format!("Budget exceeded: {}", text(p, "category")),
            body: format!(
                "Spending of {} is over the {} limit of {}",
                text(p, "spent"),
                text(p, "month"),
                text(p, "limit")
            ),
            link: Some(format!("/budgets?month={}", text(p, "month"))),
            urgency: Urgency::High,
        },
        RECEIVABLE_RECEIVED => Rendered {
            title: "Payment received".into(),
            body: format!(
                "{actor} marked {} from {} as received",
                text(p, "amount"),
                text(p, "debtor")
            ),
            link: Some("/receivables".into()),
            urgency: Urgency::Normal,
        },
        RECEIVABLE_OVERDUE => Rendered {
            title: "Payment overdue".into(),
            body: format!(
                "{} owes {}, due {}",
                text(p, "debtor"),
                text(p, "amount"),
                text(p, "due_on")
            ),
            link: Some("/receivables?status=pending".into()),
            urgency: Urgency::High,
        },
        MEMBER_ADDED => Rendered {
            title: "New family member".into(),
            body: format!("{actor} added {} to the family", text(p, "member_name")),
            link: Some("/family".into()),
            urgency: Urgency::Low,
        },
        _ => return None,
    };
    Some(rendered)
}

/// Payload field as display text. Missing and null fields render empty.
fn text(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn in_category(payload: &Value) -> String {
    match payload.get("category").and_then(Value::as_str) {
        Some(category) => format!(" ({category})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn expense_mentions_actor_amount_and_category() {
        let event = FinanceEvent::new(EXPENSE_CREATED, 1).with_payload(json!({
            "description": "Weekly shop",
            "amount": "84.20",
            "category": "Groceries",
        }));
        let rendered = render(&event, Some("Ana")).unwrap();
        assert_eq!(rendered.title, "New expense");
        assert_eq!(rendered.body, "Ana spent 84.20 on Weekly shop (Groceries)");
        assert_eq!(rendered.urgency, Urgency::Low);
    }

    #[test]
    fn uncategorized_income_omits_category() {
        let event = FinanceEvent::new(INCOME_CREATED, 1).with_payload(json!({
            "description": "Bonus",
            "amount": "500.00",
            "category": null,
        }));
        let rendered = render(&event, None).unwrap();
        assert_eq!(rendered.body, "Someone recorded Bonus of 500.00");
    }

    #[test]
    fn budget_alerts_link_to_their_month() {
        let payload = json!({
            "category": "Leisure",
            "month": "2026-03",
            "spent": "410.00",
            "limit": "400.00",
            "percent_used": "102.5",
        });
        let exceeded = render(
            &FinanceEvent::new(BUDGET_EXCEEDED, 1).with_payload(payload.clone()),
            None,
        )
        .unwrap();
        assert_eq!(exceeded.title, "Budget exceeded: Leisure");
        assert_eq!(exceeded.link.as_deref(), Some("/budgets?month=2026-03"));
        assert_eq!(exceeded.urgency, Urgency::High);

        let warning =
            render(&FinanceEvent::new(BUDGET_WARNING, 1).with_payload(payload), None).unwrap();
        assert!(warning.body.starts_with("102.5% of the 2026-03 budget used"));
        assert_eq!(warning.urgency, Urgency::Normal);
    }

    #[test]
    fn overdue_receivable() {
        let event = FinanceEvent::new(RECEIVABLE_OVERDUE, 1).with_payload(json!({
            "debtor": "Bruno",
            "amount": "150.00",
            "due_on": "2026-02-01",
        }));
        let rendered = render(&event, None).unwrap();
        assert_eq!(rendered.body, "Bruno owes 150.00, due 2026-02-01");
    }

    #[test]
    fn numbers_render_without_quotes() {
        let event = FinanceEvent::new(MEMBER_ADDED, 1).with_payload(json!({ "member_name": 7 }));
        assert_eq!(render(&event, Some("Ana")).unwrap().body, "Ana added 7 to the family");
    }

    #[test]
    fn unknown_events_are_silent() {
        assert!(render(&FinanceEvent::new("family.renamed", 1), None).is_none());
    }
}
