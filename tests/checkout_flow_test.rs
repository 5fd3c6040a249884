mod common;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::str::FromStr;

use common::{TestApp, MOCK_SIGNATURE};

fn cart() -> Value {
    json!([
        {"product_id": 4, "name": "Elegant Summer Shirt", "price": 100, "quantity": 2, "size": "M"},
        {"product_id": 11, "name": "Elegant Polo Shirt", "price": 50, "quantity": 1, "size": "L"}
    ])
}

fn checkout_request() -> Value {
    json!({
        "items": cart(),
        "origin_url": "https://shop.example",
        "shipping_address": {
            "email": "guest@example.com",
            "first_name": "Guest",
            "last_name": "Buyer",
            "address": "12 King Fahd Road",
            "city": "Riyadh",
            "region": "Riyadh Province",
            "phone": "+966500000000"
        }
    })
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn guest_checkout_creates_session_with_metadata() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post("/api/checkout/create-session", checkout_request())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "cs_test_mock");
    assert_eq!(body["url"], "https://pay.test/cs_test_mock");
    assert!(body["order_id"].as_str().unwrap().len() == 36);

    let requests = app.gateway.recorded_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.amount, dec!(250));
    assert_eq!(request.currency, "sar");
    assert_eq!(
        request.success_url,
        "https://shop.example/checkout/success?session_id={CHECKOUT_SESSION_ID}"
    );
    assert_eq!(request.cancel_url, "https://shop.example/checkout/cancel");
    assert_eq!(request.metadata.get("source").unwrap(), "7777_store");
    assert_eq!(request.metadata.get("items_count").unwrap(), "2");
    assert!(request.metadata.get("user_id").is_none());

    // The guest order and its transaction are persisted without an owner
    let order = app.order_record("cs_test_mock").await.unwrap();
    assert!(order.user_id.is_none());
    assert_eq!(order.status, "pending");
    assert_eq!(order.payment_status, "initiated");
    assert_eq!(order.subtotal, dec!(250));

    let transaction = app.transaction_record("cs_test_mock").await.unwrap();
    assert!(transaction.user_id.is_none());
    assert_eq!(transaction.amount, dec!(250));
    assert_eq!(transaction.currency, "sar");
    assert_eq!(transaction.status, "pending");
    assert_eq!(transaction.payment_status, "initiated");
    assert_eq!(transaction.items.0.len(), 2);
}

#[tokio::test]
async fn authenticated_checkout_records_order_with_totals() {
    let app = TestApp::spawn().await;
    let token = app.register_user("buyer@example.com", "secret123").await;

    let (status, created) = app
        .post_auth("/api/checkout/create-session", checkout_request(), &token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let requests = app.gateway.recorded_requests();
    assert!(requests[0].metadata.contains_key("user_id"));

    let (_, body) = app.get_auth("/api/orders", &token).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order["id"], created["order_id"]);
    assert_eq!(order["session_id"], "cs_test_mock");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "initiated");
    assert_eq!(decimal(&order["subtotal"]), dec!(250));
    assert_eq!(decimal(&order["tax"]), dec!(37.50));
    assert_eq!(decimal(&order["shipping_cost"]), dec!(0));
    assert_eq!(decimal(&order["total"]), dec!(287.50));
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["shipping_address"]["city"], "Riyadh");

    // Detail view is owner-scoped
    let order_id = order["id"].as_str().unwrap();
    let (status, detail) = app
        .get_auth(&format!("/api/orders/{}", order_id), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["session_id"], "cs_test_mock");
}

#[tokio::test]
async fn empty_cart_checkout_is_allowed() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post(
            "/api/checkout/create-session",
            json!({"items": [], "origin_url": "https://shop.example"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.gateway.recorded_requests()[0].amount, Decimal::ZERO);
}

#[tokio::test]
async fn polling_status_reconciles_order_records() {
    let app = TestApp::spawn().await;
    let token = app.register_user("poller@example.com", "secret123").await;
    app.post_auth("/api/checkout/create-session", checkout_request(), &token)
        .await;

    app.gateway.set_status("complete", "paid");
    let (status, body) = app.get("/api/checkout/status/cs_test_mock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "complete");
    assert_eq!(body["payment_status"], "paid");
    assert_eq!(body["amount_total"], 25000);

    let (_, body) = app.get_auth("/api/orders", &token).await;
    let order = &body["orders"][0];
    assert_eq!(order["status"], "complete");
    assert_eq!(order["payment_status"], "paid");

    // The transaction record moves in lockstep with the order
    let stored_order = app.order_record("cs_test_mock").await.unwrap();
    let transaction = app.transaction_record("cs_test_mock").await.unwrap();
    assert_eq!(transaction.status, "complete");
    assert_eq!(transaction.payment_status, "paid");
    assert_eq!(transaction.updated_at, stored_order.updated_at);
    assert!(transaction.updated_at > transaction.created_at);
}

#[tokio::test]
async fn polling_unknown_session_is_a_silent_noop() {
    let app = TestApp::spawn().await;

    app.gateway.set_status("expired", "unpaid");
    let (status, body) = app.get("/api/checkout/status/cs_unknown").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "expired");
}

#[tokio::test]
async fn completed_webhook_marks_order_completed() {
    let app = TestApp::spawn().await;
    let token = app.register_user("hooked@example.com", "secret123").await;
    app.post_auth("/api/checkout/create-session", checkout_request(), &token)
        .await;

    let (status, body) = app
        .send_webhook(
            json!({
                "type": "checkout.session.completed",
                "data": {"object": {"id": "cs_test_mock", "payment_status": "paid"}}
            }),
            MOCK_SIGNATURE,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");

    let (_, body) = app.get_auth("/api/orders", &token).await;
    let order = &body["orders"][0];
    assert_eq!(order["status"], "completed");
    assert_eq!(order["payment_status"], "paid");

    let transaction = app.transaction_record("cs_test_mock").await.unwrap();
    assert_eq!(transaction.status, "completed");
    assert_eq!(transaction.payment_status, "paid");
}

#[tokio::test]
async fn other_webhook_events_are_acknowledged_but_ignored() {
    let app = TestApp::spawn().await;
    let token = app.register_user("ignored@example.com", "secret123").await;
    app.post_auth("/api/checkout/create-session", checkout_request(), &token)
        .await;

    let (status, body) = app
        .send_webhook(
            json!({
                "type": "payment_intent.created",
                "data": {"object": {"id": "cs_test_mock"}}
            }),
            MOCK_SIGNATURE,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");

    let (_, body) = app.get_auth("/api/orders", &token).await;
    assert_eq!(body["orders"][0]["status"], "pending");

    let transaction = app.transaction_record("cs_test_mock").await.unwrap();
    assert_eq!(transaction.status, "pending");
    assert_eq!(transaction.payment_status, "initiated");
}

#[tokio::test]
async fn webhook_with_bad_signature_changes_nothing() {
    let app = TestApp::spawn().await;
    let token = app.register_user("sigfail@example.com", "secret123").await;
    app.post_auth("/api/checkout/create-session", checkout_request(), &token)
        .await;

    let (status, _) = app
        .send_webhook(
            json!({
                "type": "checkout.session.completed",
                "data": {"object": {"id": "cs_test_mock", "payment_status": "paid"}}
            }),
            "forged-signature",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get_auth("/api/orders", &token).await;
    assert_eq!(body["orders"][0]["status"], "pending");
}

#[tokio::test]
async fn webhook_without_signature_header_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post("/api/webhook/stripe", json!({"type": "anything"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_without_gateway_fails_cleanly() {
    let app = TestApp::spawn_without_gateway().await;

    let (status, body) = app
        .post(
            "/api/checkout/create-session",
            json!({"items": [], "origin_url": "https://shop.example"}),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("not configured"));

    let (status, _) = app.get("/api/checkout/status/cs_any").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn order_history_requires_auth_and_scopes_by_owner() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = app.register_user("alice3@example.com", "secret123").await;
    let bob = app.register_user("bob3@example.com", "secret123").await;
    app.post_auth("/api/checkout/create-session", checkout_request(), &alice)
        .await;

    let (_, body) = app.get_auth("/api/orders", &bob).await;
    assert!(body["orders"].as_array().unwrap().is_empty());

    let (status, _) = app
        .get_auth(
            "/api/orders/00000000-0000-0000-0000-000000000000",
            &bob,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
