#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use souq_api::config::AppConfig;
use souq_api::db::{self, DbConfig};
use souq_api::entities::{order, payment_transaction};
use souq_api::gateway::{
    CheckoutGateway, CheckoutSession, CreateSessionRequest, GatewayError, SessionStatus,
    WebhookEvent,
};
use souq_api::{app, build_state};

pub const MOCK_SIGNATURE: &str = "test-signature";

/// Scripted in-process stand-in for the payment provider.
pub struct MockGateway {
    pub session_id: String,
    status: Mutex<(String, String)>,
    requests: Mutex<Vec<CreateSessionRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            session_id: "cs_test_mock".to_string(),
            status: Mutex::new(("open".to_string(), "unpaid".to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sets what `session_status` reports next.
    pub fn set_status(&self, status: &str, payment_status: &str) {
        *self.status.lock().unwrap() = (status.to_string(), payment_status.to_string());
    }

    pub fn recorded_requests(&self) -> Vec<CreateSessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutGateway for MockGateway {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.requests.lock().unwrap().push(request);
        Ok(CheckoutSession {
            session_id: self.session_id.clone(),
            url: format!("https://pay.test/{}", self.session_id),
        })
    }

    async fn session_status(&self, _session_id: &str) -> Result<SessionStatus, GatewayError> {
        let (status, payment_status) = self.status.lock().unwrap().clone();
        Ok(SessionStatus {
            status,
            payment_status,
            amount_total: Some(25000),
            currency: Some("sar".to_string()),
            metadata: Default::default(),
        })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, GatewayError> {
        if signature != MOCK_SIGNATURE {
            return Err(GatewayError::InvalidSignature);
        }
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;
        let event_type = value["type"]
            .as_str()
            .ok_or_else(|| GatewayError::InvalidPayload("missing type".into()))?;
        let session_id = value["data"]["object"]["id"]
            .as_str()
            .ok_or_else(|| GatewayError::InvalidPayload("missing session id".into()))?;
        Ok(WebhookEvent {
            event_type: event_type.to_string(),
            session_id: session_id.to_string(),
            payment_status: value["data"]["object"]["payment_status"]
                .as_str()
                .map(String::from),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<MockGateway>,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::build(true).await
    }

    /// App without payment credentials; checkout endpoints must fail cleanly.
    pub async fn spawn_without_gateway() -> Self {
        Self::build(false).await
    }

    async fn build(with_gateway: bool) -> Self {
        let config = AppConfig::new(
            "sqlite::memory:".to_string(),
            "integration_test_secret_key_with_enough_length".to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "development".to_string(),
        );

        // A single pooled connection keeps the in-memory database alive and
        // shared across requests.
        let conn = db::establish_connection_with_config(DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(5),
            sqlx_logging: false,
        })
        .await
        .expect("failed to open test database");
        db::run_migrations(&conn).await.expect("migrations failed");

        let gateway = Arc::new(MockGateway::new());
        let gateway_arg: Option<Arc<dyn CheckoutGateway>> = if with_gateway {
            Some(gateway.clone())
        } else {
            None
        };

        let db = conn.clone();
        let state = build_state(config, conn, gateway_arg).expect("failed to build state");
        Self {
            router: app(state),
            gateway,
            db,
        }
    }

    /// The stored order for a gateway session, straight from the database.
    pub async fn order_record(&self, session_id: &str) -> Option<order::Model> {
        order::Entity::find()
            .filter(order::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await
            .expect("order lookup failed")
    }

    /// The stored payment transaction for a gateway session.
    pub async fn transaction_record(
        &self,
        session_id: &str,
    ) -> Option<payment_transaction::Model> {
        payment_transaction::Entity::find()
            .filter(payment_transaction::Column::SessionId.eq(session_id))
            .one(&self.db)
            .await
            .expect("payment transaction lookup failed")
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None, Some(token)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body), None).await
    }

    pub async fn post_auth(&self, path: &str, body: Value, token: &str) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body), Some(token)).await
    }

    pub async fn put_auth(&self, path: &str, body: Value, token: &str) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body), Some(token)).await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, None, Some(token)).await
    }

    /// Registers an account and returns its access token.
    pub async fn register_user(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                json!({
                    "email": email,
                    "password": password,
                    "name": "Test User"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Sends a signed webhook the mock gateway will accept.
    pub async fn send_webhook(&self, payload: Value, signature: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/webhook/stripe")
            .header(header::CONTENT_TYPE, "application/json")
            .header("stripe-signature", signature)
            .body(Body::from(payload.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}
