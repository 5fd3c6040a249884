mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn root_routes_respond() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello World");

    let (status, _) = app.get("/api/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn status_checks_are_recorded_and_listed() {
    let app = TestApp::spawn().await;

    let (status, created) = app
        .post("/api/status", json!({"client_name": "uptime-bot"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["client_name"], "uptime-bot");
    assert!(created["id"].as_str().is_some());

    let (status, body) = app.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    let checks = body.as_array().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0]["client_name"], "uptime-bot");
}

#[tokio::test]
async fn blank_client_name_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app.post("/api/status", json!({"client_name": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "souq-api");
    assert!(body["paths"]["/api/auth/register"].is_object());
}
