//! Periodic scan for overdue receivables.
//!
//! A pending receivable whose due date has passed produces exactly one
//! `receivable.overdue` event. The receivable is claimed with
//! `overdue_notified_at` before the event is published so that concurrent
//! scans cannot announce it twice. Moving the due date resets the claim.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hearth_core::event_types::RECEIVABLE_OVERDUE;
use hearth_db::repositories::ReceivableRepo;
use hearth_events::{EventBus, FinanceEvent};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the reminder loop until `cancel` is triggered.
pub async fn run(pool: PgPool, bus: Arc<EventBus>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Receivable reminder job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Receivable reminder job stopping");
                break;
            }
            _ = interval.tick() => {
                match scan(&pool, &bus).await {
                    Ok(0) => tracing::debug!("Receivable reminders: nothing overdue"),
                    Ok(announced) => tracing::info!(
                        announced,
                        "Receivable reminders: overdue receivables announced"
                    ),
                    Err(e) => tracing::error!(error = %e, "Receivable reminders: scan failed"),
                }
            }
        }
    }
}

/// Announce every newly overdue receivable. Returns how many were announced.
pub async fn scan(pool: &PgPool, bus: &EventBus) -> Result<usize, sqlx::Error> {
    let today = Utc::now().date_naive();
    let overdue = ReceivableRepo::overdue_unnotified(pool, today).await?;

    let mut announced = 0;
    for receivable in overdue {
        if !ReceivableRepo::mark_overdue_notified(pool, receivable.id).await? {
            continue;
        }
        bus.publish(
            FinanceEvent::new(RECEIVABLE_OVERDUE, receivable.family_id)
                .with_source("receivable", receivable.id)
                .with_payload(serde_json::json!({
                    "debtor": receivable.debtor,
                    "amount": receivable.amount,
                    "due_on": receivable.due_on,
                })),
        );
        announced += 1;
    }
    Ok(announced)
}
