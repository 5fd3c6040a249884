use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

pub mod stripe;

pub use stripe::StripeGateway;

/// Failures talking to (or verifying callbacks from) the payment provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook signature verification failed")]
    InvalidSignature,

    #[error("webhook payload rejected: {0}")]
    InvalidPayload(String),

    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    /// Total amount in major units (e.g. 149.50 SAR)
    pub amount: Decimal,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

/// A newly created hosted session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// Point-in-time view of a session as reported by the provider.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub status: String,
    pub payment_status: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// A verified webhook notification.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event_type: String,
    pub session_id: String,
    pub payment_status: Option<String>,
}

/// Hosted-checkout provider abstraction. Object-safe so the application can
/// run against a stub in tests.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;

    /// Verifies the webhook signature and parses the event. Pure computation,
    /// no network.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, GatewayError>;
}
