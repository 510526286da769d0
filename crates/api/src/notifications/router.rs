//! Event-to-notification routing engine.

use std::sync::Arc;

use hearth_core::channels::{CHANNEL_IN_APP, CHANNEL_PUSH};
use hearth_core::event_types::{audience_for, Audience};
use hearth_core::types::DbId;
use hearth_db::models::notification::CreateNotification;
use hearth_db::repositories::{NotificationRepo, PushSubscriptionRepo, UserRepo};
use hearth_db::DbPool;
use hearth_events::{FinanceEvent, PushError, PushSender, PushTarget, Urgency};
use tokio::sync::broadcast;

use crate::notifications::templates::{render, Rendered};

type RouteResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Routes finance events to the members of the affected family.
///
/// Every recipient gets an in-app notification. When a [`PushSender`] is
/// configured, each of the recipient's push subscriptions is woken as well;
/// subscriptions the push service reports as gone are deleted.
pub struct NotificationRouter {
    pool: DbPool,
    push: Option<Arc<dyn PushSender>>,
}

impl NotificationRouter {
    /// `push` is `None` when VAPID keys are not configured.
    pub fn new(pool: DbPool, push: Option<Arc<dyn PushSender>>) -> Self {
        Self { pool, push }
    }

    /// Run the routing loop until the [`EventBus`](hearth_events::EventBus)
    /// is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<FinanceEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            family_id = event.family_id,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event. Returns the number of in-app notifications stored.
    pub async fn route_event(&self, event: &FinanceEvent) -> RouteResult<usize> {
        let actor_name = match event.actor_user_id {
            Some(actor) => UserRepo::find_by_id(&self.pool, actor).await?.map(|u| u.name),
            None => None,
        };
        let Some(rendered) = render(event, actor_name.as_deref()) else {
            tracing::debug!(event_type = %event.event_type, "No notification for event type");
            return Ok(0);
        };

        let recipients = self.recipients(event).await?;
        for &user_id in &recipients {
            self.deliver(user_id, event, &rendered).await?;
        }

        tracing::debug!(
            event_type = %event.event_type,
            family_id = event.family_id,
            recipients = recipients.len(),
            "Event routed"
        );
        Ok(recipients.len())
    }

    /// Active members of the event's family, minus the actor for activity events.
    async fn recipients(&self, event: &FinanceEvent) -> RouteResult<Vec<DbId>> {
        let members = UserRepo::active_member_ids(&self.pool, event.family_id).await?;
        let recipients = match audience_for(&event.event_type) {
            Audience::WholeFamily => members,
            Audience::OthersInFamily => members
                .into_iter()
                .filter(|id| Some(*id) != event.actor_user_id)
                .collect(),
        };
        Ok(recipients)
    }

    async fn deliver(
        &self,
        user_id: DbId,
        event: &FinanceEvent,
        rendered: &Rendered,
    ) -> RouteResult<()> {
        let notification = NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                family_id: event.family_id,
                user_id,
                kind: event.event_type.clone(),
                title: rendered.title.clone(),
                body: rendered.body.clone(),
                link: rendered.link.clone(),
            },
        )
        .await?;
        tracing::trace!(
            user_id,
            channel = CHANNEL_IN_APP,
            notification_id = notification.id,
            "Stored"
        );

        let Some(push) = &self.push else {
            return Ok(());
        };
        if self.push_to_user(push.as_ref(), user_id, rendered.urgency).await? {
            NotificationRepo::mark_delivered(&self.pool, notification.id).await?;
        }
        Ok(())
    }

    /// Wake every subscription of `user_id`. Returns `true` if at least one
    /// push service accepted the message.
    async fn push_to_user(
        &self,
        push: &dyn PushSender,
        user_id: DbId,
        urgency: Urgency,
    ) -> RouteResult<bool> {
        let subscriptions = PushSubscriptionRepo::list_for_user(&self.pool, user_id).await?;
        let mut delivered = false;

        for sub in subscriptions {
            let target = PushTarget {
                subscription_id: sub.id,
                endpoint: sub.endpoint,
            };
            match push.send(&target, urgency).await {
                Ok(()) => {
                    PushSubscriptionRepo::touch(&self.pool, sub.id).await?;
                    delivered = true;
                }
                Err(PushError::Gone) => {
                    PushSubscriptionRepo::delete(&self.pool, sub.id).await?;
                    tracing::info!(
                        user_id,
                        subscription_id = sub.id,
                        "Removed expired push subscription"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        user_id,
                        subscription_id = sub.id,
                        channel = CHANNEL_PUSH,
                        "Push delivery failed"
                    );
                }
            }
        }
        Ok(delivered)
    }
}
