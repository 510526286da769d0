//! Tests for event routing into in-app notifications and Web Push, the
//! notification endpoints, and the overdue receivable scan.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, category_id, delete_auth, get_auth, member_token, post_json_auth, send};
use hearth_api::background::receivable_reminders;
use hearth_api::notifications::NotificationRouter;
use hearth_events::{FinanceEvent, PushError, PushSender, PushTarget, Urgency, VapidConfig};
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::broadcast;

const GONE_ENDPOINT: &str = "https://push.example.com/gone";
const LIVE_ENDPOINT: &str = "https://push.example.com/live";

/// Records every push and reports [`GONE_ENDPOINT`] as expired.
#[derive(Default)]
struct RecordingPush {
    sent: Mutex<Vec<(String, Urgency)>>,
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, target: &PushTarget, urgency: Urgency) -> Result<(), PushError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.endpoint.clone(), urgency));
        if target.endpoint == GONE_ENDPOINT {
            Err(PushError::Gone)
        } else {
            Ok(())
        }
    }
}

fn take(rx: &mut broadcast::Receiver<FinanceEvent>, event_type: &str) -> FinanceEvent {
    loop {
        let event = rx.try_recv().expect("event should have been published");
        if event.event_type == event_type {
            return event;
        }
    }
}

async fn subscribe(app: &axum::Router, token: &str, endpoint: &str) {
    let response = post_json_auth(
        app,
        "/api/v1/push/subscriptions",
        token,
        json!({ "endpoint": endpoint, "keys": { "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM", "auth": "tBHItJI5svbpez7KI4CCXg" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activity_reaches_other_members_in_app_and_by_push(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut rx = bus.subscribe();
    let admin = common::admin_token(&app, "Route", "admin@route.test").await;
    let member = member_token(&app, &admin, "Lia", "lia@route.test").await;
    subscribe(&app, &member, LIVE_ENDPOINT).await;
    subscribe(&app, &member, GONE_ENDPOINT).await;

    let groceries = category_id(&app, &admin, "expense", "Groceries").await;
    let response = post_json_auth(
        &app,
        "/api/v1/expenses",
        &admin,
        json!({ "category_id": groceries, "description": "Market", "amount": "42.00", "spent_on": "2026-03-02" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = take(&mut rx, "expense.created");

    let push = Arc::new(RecordingPush::default());
    let router = NotificationRouter::new(pool.clone(), Some(push.clone() as Arc<dyn PushSender>));
    let stored = router.route_event(&event).await.unwrap();
    assert_eq!(stored, 1, "the actor is not notified of their own expense");

    let sent = push.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(_, urgency)| *urgency == Urgency::Low));

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM push_subscriptions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1, "expired subscription is removed");

    let list = body_json(get_auth(&app, "/api/v1/notifications", &member).await).await;
    let notification = &list["data"][0];
    assert_eq!(notification["kind"], "expense.created");
    assert_eq!(notification["is_delivered"], true);
    assert!(notification["body"].as_str().unwrap().contains("Route Admin"));
    assert!(notification["body"].as_str().unwrap().contains("Market"));

    let admin_list = body_json(get_auth(&app, "/api/v1/notifications", &admin).await).await;
    assert!(admin_list["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn budget_alerts_reach_the_whole_family(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut rx = bus.subscribe();
    let admin = common::admin_token(&app, "Alert", "admin@alert.test").await;
    let member = member_token(&app, &admin, "Teo", "teo@alert.test").await;
    let groceries = category_id(&app, &admin, "expense", "Groceries").await;

    post_json_auth(
        &app,
        "/api/v1/budgets",
        &admin,
        json!({ "category_id": groceries, "month": "2026-03", "amount_limit": "10.00" }),
    )
    .await;
    post_json_auth(
        &app,
        "/api/v1/expenses",
        &member,
        json!({ "category_id": groceries, "description": "Feast", "amount": "25.00", "spent_on": "2026-03-09" }),
    )
    .await;
    let event = take(&mut rx, "budget.exceeded");

    // Push disabled: in-app only.
    let router = NotificationRouter::new(pool, None);
    assert_eq!(router.route_event(&event).await.unwrap(), 2);

    for token in [&admin, &member] {
        let list = body_json(get_auth(&app, "/api/v1/notifications", token).await).await;
        assert_eq!(list["data"][0]["kind"], "budget.exceeded");
        assert_eq!(list["data"][0]["is_delivered"], false);
        assert_eq!(list["data"][0]["link"], "/budgets?month=2026-03");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_events_are_ignored(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let registered = common::register(&app, "Quiet", "admin@quiet.test").await;
    let family_id = registered["user"]["family_id"].as_i64().unwrap();

    let router = NotificationRouter::new(pool, None);
    let event = FinanceEvent::new("something.else", family_id);
    assert_eq!(router.route_event(&event).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn notification_endpoints_track_read_state(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut rx = bus.subscribe();
    let admin = common::admin_token(&app, "Read", "admin@read.test").await;
    let member = member_token(&app, &admin, "Noa", "noa@read.test").await;

    let router = NotificationRouter::new(pool, None);
    for description in ["One", "Two", "Three"] {
        post_json_auth(
            &app,
            "/api/v1/incomes",
            &admin,
            json!({ "description": description, "amount": "1.00", "received_on": "2026-03-01" }),
        )
        .await;
        let event = take(&mut rx, "income.created");
        router.route_event(&event).await.unwrap();
    }

    let count =
        body_json(get_auth(&app, "/api/v1/notifications/unread-count", &member).await).await;
    assert_eq!(count["data"]["count"], 3);

    let list = body_json(get_auth(&app, "/api/v1/notifications", &member).await).await;
    let ids: Vec<i64> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();

    let response = post_json_auth(
        &app,
        &format!("/api/v1/notifications/{}/read", ids[0]),
        &member,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    // Reading twice is fine.
    let response = post_json_auth(
        &app,
        &format!("/api/v1/notifications/{}/read", ids[0]),
        &member,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    // Someone else's notification is not found.
    let response = post_json_auth(
        &app,
        &format!("/api/v1/notifications/{}/read", ids[1]),
        &admin,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let unread =
        body_json(get_auth(&app, "/api/v1/notifications?unread_only=true", &member).await).await;
    assert_eq!(unread["data"].as_array().unwrap().len(), 2);

    let response = post_json_auth(&app, "/api/v1/notifications/read-all", &member, json!({})).await;
    assert_eq!(body_json(response).await["data"]["updated"], 2);

    let response = delete_auth(&app, &format!("/api/v1/notifications/{}", ids[2]), &member).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let list = body_json(get_auth(&app, "/api/v1/notifications", &member).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Push registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_key_is_hidden_when_push_is_off(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::admin_token(&app, "Off", "admin@off.test").await;
    let response = get_auth(&app, "/api/v1/push/public-key", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut config = common::test_config();
    config.vapid = Some(VapidConfig {
        public_key: "BPublicKeyForTests".to_string(),
        private_key_pem: String::new(),
        subject: "mailto:ops@example.com".to_string(),
    });
    let (app, _bus) = common::build_test_app_with_config(pool, config);
    let response = get_auth(&app, "/api/v1/push/public-key", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["public_key"], "BPublicKeyForTests");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subscriptions_validate_and_unsubscribe(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Sub", "admin@sub.test").await;

    let response = post_json_auth(
        &app,
        "/api/v1/push/subscriptions",
        &token,
        json!({ "endpoint": "http://insecure.example.com/x", "keys": { "p256dh": "a", "auth": "b" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        &app,
        "/api/v1/push/subscriptions",
        &token,
        json!({ "endpoint": LIVE_ENDPOINT, "keys": { "p256dh": "", "auth": "b" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    subscribe(&app, &token, LIVE_ENDPOINT).await;
    // Re-subscribing the same endpoint is an upsert.
    subscribe(&app, &token, LIVE_ENDPOINT).await;

    let response = send(
        &app,
        axum::http::Method::DELETE,
        "/api/v1/push/subscriptions",
        Some(&token),
        Some(json!({ "endpoint": LIVE_ENDPOINT })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        axum::http::Method::DELETE,
        "/api/v1/push/subscriptions",
        Some(&token),
        Some(json!({ "endpoint": LIVE_ENDPOINT })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Overdue receivables
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn overdue_receivables_are_announced_once(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let token = common::admin_token(&app, "Late", "admin@late.test").await;

    for (debtor, due_on) in [("Late Larry", "2020-05-01"), ("Future Fay", "2099-05-01")] {
        let response = post_json_auth(
            &app,
            "/api/v1/receivables",
            &token,
            json!({ "debtor": debtor, "amount": "75.00", "due_on": due_on }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let mut rx = bus.subscribe();
    assert_eq!(receivable_reminders::scan(&pool, &bus).await.unwrap(), 1);
    let event = take(&mut rx, "receivable.overdue");
    assert_eq!(event.payload["debtor"], "Late Larry");
    assert_eq!(event.payload["due_on"], "2020-05-01");
    assert!(event.actor_user_id.is_none());

    assert_eq!(receivable_reminders::scan(&pool, &bus).await.unwrap(), 0);

    // Every member hears about it, including the one who recorded it.
    let router = NotificationRouter::new(pool, None);
    assert_eq!(router.route_event(&event).await.unwrap(), 1);
    let list = body_json(get_auth(&app, "/api/v1/notifications", &token).await).await;
    assert!(list["data"][0]["body"].as_str().unwrap().contains("Late Larry"));
}
