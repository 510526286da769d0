//! Integration tests for offline sync (`/sync/pull` and `/sync/push`).

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{body_json, category_id, delete_auth, get_auth, post_json_auth};
use hearth_api::background::receivable_reminders;
use hearth_db::repositories::ReceivableRepo;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;

fn expense(client_id: Uuid, amount: &str, updated_at: &str) -> Value {
    json!({
        "client_id": client_id,
        "description": "Bakery",
        "amount": amount,
        "spent_on": "2026-03-02",
        "updated_at": updated_at,
    })
}

fn receivable(client_id: Uuid, status: &str, due_on: &str, updated_at: &str) -> Value {
    json!({
        "client_id": client_id,
        "debtor": "Cousin Bia",
        "amount": "80.00",
        "due_on": due_on,
        "status": status,
        "updated_at": updated_at,
    })
}

fn pull_uri(since: &str) -> String {
    format!("/api/v1/sync/pull?since={}", since.replace('+', "%2B"))
}

async fn push(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app, "/api/v1/sync/push", token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn push_creates_then_applies_newer_and_ignores_older(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Sync", "sync@example.com").await;
    let id = Uuid::new_v4();

    let data = push(
        &app,
        &token,
        json!({ "expenses": [expense(id, "4.50", "2026-03-02T08:00:00Z")] }),
    )
    .await;
    assert_eq!(data["expenses"][0]["status"], "created");
    assert_eq!(data["expenses"][0]["server_updated_at"], "2026-03-02T08:00:00Z");
    assert!(data["incomes"].as_array().unwrap().is_empty());

    let data = push(
        &app,
        &token,
        json!({ "expenses": [expense(id, "6.00", "2026-03-02T09:00:00Z")] }),
    )
    .await;
    assert_eq!(data["expenses"][0]["status"], "updated");

    // Same timestamp as the server copy: the server wins.
    let data = push(
        &app,
        &token,
        json!({ "expenses": [expense(id, "1.00", "2026-03-02T09:00:00Z")] }),
    )
    .await;
    assert_eq!(data["expenses"][0]["status"], "stale");
    let data = push(
        &app,
        &token,
        json!({ "expenses": [expense(id, "1.00", "2026-03-02T07:00:00Z")] }),
    )
    .await;
    assert_eq!(data["expenses"][0]["status"], "stale");
    assert_eq!(data["expenses"][0]["server_updated_at"], "2026-03-02T09:00:00Z");

    let list = body_json(get_auth(&app, "/api/v1/expenses", &token).await).await;
    let items = list["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["amount"], "6.00");
    assert_eq!(items[0]["client_id"], id.to_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_records_are_rejected_individually(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Mixed", "mixed@example.com").await;
    let salary = category_id(&app, &token, "income", "Salary").await;
    let good = Uuid::new_v4();

    let data = push(
        &app,
        &token,
        json!({
            "expenses": [
                expense(good, "3.00", "2026-03-02T08:00:00Z"),
                expense(Uuid::new_v4(), "-3.00", "2026-03-02T08:00:00Z"),
                {
                    "client_id": Uuid::new_v4(),
                    "category_id": salary,
                    "description": "Wrong kind",
                    "amount": "3.00",
                    "spent_on": "2026-03-02",
                    "updated_at": "2026-03-02T08:00:00Z",
                },
            ],
            "receivables": [{
                "client_id": Uuid::new_v4(),
                "debtor": "Zé",
                "amount": "10.00",
                "due_on": "2026-04-01",
                "status": "forgotten",
                "updated_at": "2026-03-02T08:00:00Z",
            }],
        }),
    )
    .await;

    let statuses: Vec<&str> = data["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["created", "rejected", "rejected"]);
    assert!(data["expenses"][1]["error"].is_string());
    assert_eq!(data["receivables"][0]["status"], "rejected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_ids_cannot_cross_families(pool: PgPool) {
    let app = common::build_test_app(pool);
    let ours = common::admin_token(&app, "Ours", "ours@example.com").await;
    let theirs = common::admin_token(&app, "Theirs", "theirs@example.com").await;
    let id = Uuid::new_v4();

    push(&app, &ours, json!({ "expenses": [expense(id, "2.00", "2026-03-02T08:00:00Z")] })).await;
    let data = push(
        &app,
        &theirs,
        json!({ "expenses": [expense(id, "9.00", "2026-03-02T10:00:00Z")] }),
    )
    .await;
    assert_eq!(data["expenses"][0]["status"], "rejected");
    assert_eq!(
        data["expenses"][0]["error"],
        "client_id is already used by another family"
    );

    let list = body_json(get_auth(&app, "/api/v1/expenses", &ours).await).await;
    assert_eq!(list["data"]["items"][0]["amount"], "2.00");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pull_returns_changes_including_tombstones(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Pull", "pull@example.com").await;

    let first = body_json(get_auth(&app, "/api/v1/sync/pull", &token).await).await;
    assert!(first["data"]["expenses"].as_array().unwrap().is_empty());
    assert!(first["data"]["server_time"].is_string());

    let response = post_json_auth(
        &app,
        "/api/v1/expenses",
        &token,
        json!({ "description": "Taxi", "amount": "15.00", "spent_on": "2026-03-04" }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let response = delete_auth(&app, &format!("/api/v1/expenses/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let since = first["data"]["server_time"].as_str().unwrap();
    let pulled = body_json(get_auth(&app, &pull_uri(since), &token).await).await;
    let expenses = pulled["data"]["expenses"].as_array().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0]["id"], id);
    assert!(expenses[0]["deleted_at"].is_string(), "deletions sync as tombstones");

    // A pushed tombstone never shows up in the REST listing.
    let data = push(
        &app,
        &token,
        json!({ "incomes": [{
            "client_id": Uuid::new_v4(),
            "description": "Refund",
            "amount": "15.00",
            "received_on": "2026-03-05",
            "updated_at": "2026-03-05T12:00:00Z",
            "deleted_at": "2026-03-05T12:00:00Z",
        }] }),
    )
    .await;
    assert_eq!(data["incomes"][0]["status"], "created");
    let incomes = body_json(get_auth(&app, "/api/v1/incomes", &token).await).await;
    assert!(incomes["data"]["items"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_batch_is_refused(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Big", "big@example.com").await;

    let records: Vec<Value> = (0..=hearth_core::sync::MAX_PUSH_RECORDS)
        .map(|_| expense(Uuid::new_v4(), "1.00", "2026-03-02T08:00:00Z"))
        .collect();
    let response =
        post_json_auth(&app, "/api/v1/sync/push", &token, json!({ "expenses": records })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backdated_push_reaches_devices_that_already_pulled(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Late", "late@example.com").await;

    let first = body_json(get_auth(&app, "/api/v1/sync/pull", &token).await).await;
    let since = first["data"]["server_time"].as_str().unwrap().to_string();

    // Edited offline an hour before the other device pulled.
    let edited_at = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
    let id = Uuid::new_v4();
    let data = push(&app, &token, json!({ "expenses": [expense(id, "7.25", &edited_at)] })).await;
    assert_eq!(data["expenses"][0]["status"], "created");

    let pulled = body_json(get_auth(&app, &pull_uri(&since), &token).await).await;
    let expenses = pulled["data"]["expenses"].as_array().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0]["client_id"], id.to_string());
    assert_eq!(expenses[0]["amount"], "7.25");

    // Nothing new after the latest cursor.
    let latest = pulled["data"]["server_time"].as_str().unwrap();
    let again = body_json(get_auth(&app, &pull_uri(latest), &token).await).await;
    assert!(again["data"]["expenses"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settled_receivables_cannot_be_reopened_by_sync(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = common::admin_token(&app, "Settle", "settle@example.com").await;
    let other = category_id(&app, &token, "income", "Other income").await;
    let id = Uuid::new_v4();

    let data = push(
        &app,
        &token,
        json!({ "receivables": [receivable(id, "pending", "2026-04-01", "2026-03-01T08:00:00Z")] }),
    )
    .await;
    assert_eq!(data["receivables"][0]["status"], "created");

    let row = ReceivableRepo::find_by_client_id(&pool, id).await.unwrap().unwrap();
    let response = post_json_auth(
        &app,
        &format!("/api/v1/receivables/{}/receive", row.id),
        &token,
        json!({ "received_on": "2026-03-20", "create_income": true, "category_id": other }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = push(
        &app,
        &token,
        json!({ "receivables": [receivable(id, "pending", "2026-04-01", "2099-01-01T00:00:00Z")] }),
    )
    .await;
    assert_eq!(data["receivables"][0]["status"], "rejected");
    assert_eq!(data["receivables"][0]["error"], "Receivable is already received");

    let row = ReceivableRepo::find_by_client_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status, "received");
    assert!(row.income_id.is_some());
    assert!(row.received_on.is_some());

    // A settled receivable can still be deleted, and keeps its contents.
    let mut tombstone = receivable(id, "received", "2030-01-01", "2099-01-02T00:00:00Z");
    tombstone["received_on"] = json!("2026-03-20");
    tombstone["amount"] = json!("1.00");
    tombstone["deleted_at"] = json!("2099-01-02T00:00:00Z");
    let data = push(&app, &token, json!({ "receivables": [tombstone] })).await;
    assert_eq!(data["receivables"][0]["status"], "updated");

    let row = ReceivableRepo::find_by_client_id(&pool, id).await.unwrap().unwrap();
    assert!(row.deleted_at.is_some());
    assert_eq!(row.amount.to_string(), "80.00");
    assert_eq!(row.due_on.to_string(), "2026-04-01");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn received_status_needs_a_received_date(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = common::admin_token(&app, "Dates", "dates@example.com").await;

    let mut cancelled =
        receivable(Uuid::new_v4(), "cancelled", "2026-04-01", "2026-03-01T08:00:00Z");
    cancelled["received_on"] = json!("2026-03-02");
    let mut received = receivable(Uuid::new_v4(), "received", "2026-04-01", "2026-03-01T08:00:00Z");
    received["received_on"] = json!("2026-03-02");

    let data = push(
        &app,
        &token,
        json!({ "receivables": [
            receivable(Uuid::new_v4(), "received", "2026-04-01", "2026-03-01T08:00:00Z"),
            cancelled,
            received,
        ] }),
    )
    .await;
    let statuses: Vec<&str> = data["receivables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["rejected", "rejected", "created"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_the_due_date_rearms_the_overdue_reminder(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let token = common::admin_token(&app, "Rearm", "rearm@example.com").await;
    let id = Uuid::new_v4();

    push(
        &app,
        &token,
        json!({ "receivables": [receivable(id, "pending", "2020-05-01", "2026-03-01T08:00:00Z")] }),
    )
    .await;
    assert_eq!(receivable_reminders::scan(&pool, &bus).await.unwrap(), 1);

    // Same due date: the claim stays.
    let mut edited = receivable(id, "pending", "2020-05-01", "2026-03-02T08:00:00Z");
    edited["debtor"] = json!("Cousin Bia Souza");
    push(&app, &token, json!({ "receivables": [edited] })).await;
    assert_eq!(receivable_reminders::scan(&pool, &bus).await.unwrap(), 0);

    let data = push(
        &app,
        &token,
        json!({ "receivables": [receivable(id, "pending", "2020-06-01", "2026-03-03T08:00:00Z")] }),
    )
    .await;
    assert_eq!(data["receivables"][0]["status"], "updated");
    let row = ReceivableRepo::find_by_client_id(&pool, id).await.unwrap().unwrap();
    assert!(row.overdue_notified_at.is_none());
    assert_eq!(receivable_reminders::scan(&pool, &bus).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_writes_publish_no_events(pool: PgPool) {
    let (app, bus) = common::build_test_app_with_bus(pool);
    let token = common::admin_token(&app, "Quiet", "quiet@example.com").await;
    let groceries = category_id(&app, &token, "expense", "Groceries").await;
    let response = post_json_auth(
        &app,
        "/api/v1/budgets",
        &token,
        json!({ "category_id": groceries, "month": "2026-03", "amount_limit": "10.00" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut rx = bus.subscribe();
    let mut over_budget = expense(Uuid::new_v4(), "50.00", "2026-03-02T08:00:00Z");
    over_budget["category_id"] = json!(groceries);
    let overdue = receivable(Uuid::new_v4(), "pending", "2020-01-01", "2026-03-02T08:00:00Z");
    let data = push(
        &app,
        &token,
        json!({
            "expenses": [over_budget],
            "incomes": [{
                "client_id": Uuid::new_v4(),
                "description": "Allowance",
                "amount": "20.00",
                "received_on": "2026-03-02",
                "updated_at": "2026-03-02T08:00:00Z",
            }],
            "receivables": [overdue],
        }),
    )
    .await;
    assert_eq!(data["expenses"][0]["status"], "created");
    assert_eq!(data["incomes"][0]["status"], "created");
    assert_eq!(data["receivables"][0]["status"], "created");

    assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
}
