use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    CheckoutGateway, CheckoutSession, CreateSessionRequest, GatewayError, SessionStatus,
    WebhookEvent,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

type HmacSha256 = Hmac<Sha256>;

/// Stripe Checkout Sessions client.
///
/// The whole cart is charged as a single aggregated line item at the computed
/// total; per-item breakdown lives on our own order record.
pub struct StripeGateway {
    http: Client,
    api_key: String,
    webhook_secret: Option<String>,
    base_url: String,
    tolerance: Duration,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: WebhookObject,
}

#[derive(Debug, Deserialize)]
struct WebhookObject {
    id: String,
    #[serde(default)]
    payment_status: Option<String>,
}

impl StripeGateway {
    pub fn new(api_key: String, webhook_secret: Option<String>, tolerance: Option<Duration>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            webhook_secret,
            base_url: STRIPE_API_BASE.to_string(),
            tolerance: tolerance.unwrap_or(DEFAULT_TOLERANCE),
        }
    }

    /// Points the client at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn minor_units(amount: rust_decimal::Decimal) -> Result<i64, GatewayError> {
        (amount * dec!(100)).round().to_i64().ok_or_else(|| {
            GatewayError::UnexpectedResponse(format!("amount out of range: {}", amount))
        })
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Parses a `Stripe-Signature` header into (timestamp, v1 signatures).
    fn parse_signature_header(header: &str) -> Option<(i64, Vec<String>)> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value.to_string()),
                _ => {}
            }
        }

        timestamp.filter(|_| !signatures.is_empty()).map(|t| (t, signatures))
    }

    fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let unit_amount = Self::minor_units(request.amount)?;

        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), request.success_url),
            ("cancel_url".into(), request.cancel_url),
            (
                "line_items[0][price_data][currency]".into(),
                request.currency.to_lowercase(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                "Order".into(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                unit_amount.to_string(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
        ];
        for (key, value) in request.metadata {
            form.push((format!("metadata[{}]", key), value));
        }

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.api_key)
            .form(&form)
            .send()
            .await?;
        let session: SessionResponse = Self::check_response(response).await?.json().await?;

        let url = session.url.ok_or_else(|| {
            GatewayError::UnexpectedResponse("session response is missing the hosted url".into())
        })?;
        debug!(session_id = %session.id, "Created checkout session");

        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let response = self
            .http
            .get(format!("{}/v1/checkout/sessions/{}", self.base_url, session_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let session: SessionResponse = Self::check_response(response).await?.json().await?;

        Ok(SessionStatus {
            status: session.status.unwrap_or_else(|| "unknown".into()),
            payment_status: session.payment_status.unwrap_or_else(|| "unknown".into()),
            amount_total: session.amount_total,
            currency: session.currency,
            metadata: session.metadata,
        })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, GatewayError> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(GatewayError::InvalidSignature)?;

        let (timestamp, signatures) =
            Self::parse_signature_header(signature).ok_or(GatewayError::InvalidSignature)?;

        let age = (Utc::now().timestamp() - timestamp).unsigned_abs();
        if age > self.tolerance.as_secs() {
            warn!(age_secs = age, "Webhook timestamp outside tolerance");
            return Err(GatewayError::InvalidSignature);
        }

        // Signed payload is "{timestamp}.{raw body}"
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| GatewayError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        let matched = signatures
            .iter()
            .any(|sig| Self::constant_time_eq(sig.as_bytes(), expected.as_bytes()));
        if !matched {
            return Err(GatewayError::InvalidSignature);
        }

        let envelope: WebhookEnvelope = serde_json::from_slice(payload)
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;

        Ok(WebhookEvent {
            event_type: envelope.event_type,
            session_id: envelope.data.object.id,
            payment_status: envelope.data.object.payment_status,
        })
    }
}
