use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::common::success_response;
use crate::auth::OptionalUser;
use crate::errors::ServiceError;
use crate::services::checkout::{
    CheckoutStatusResponse, CreateCheckoutRequest, CreateCheckoutResponse,
};
use crate::AppState;

pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/create-session", post(create_session))
        .route("/status/:session_id", get(session_status))
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}

/// Start a hosted checkout session. Works for guests; a valid bearer token
/// attributes the order to the account.
#[utoipa::path(
    post,
    path = "/api/checkout/create-session",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Hosted session created", body = CreateCheckoutResponse),
        (status = 500, description = "Gateway not configured"),
        (status = 502, description = "Gateway failure")
    ),
    tag = "checkout"
)]
pub async fn create_session(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .checkout
        .create_session(request, user.as_ref())
        .await?;
    Ok(success_response(response))
}

/// Poll the gateway for a session's state and reconcile local records.
#[utoipa::path(
    get,
    path = "/api/checkout/status/{session_id}",
    params(("session_id" = String, Path, description = "Gateway session id")),
    responses(
        (status = 200, description = "Session state", body = CheckoutStatusResponse),
        (status = 502, description = "Gateway failure")
    ),
    tag = "checkout"
)]
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.checkout.poll_status(&session_id).await?;
    Ok(success_response(response))
}

/// Gateway callback. The body must be read raw so the signature check covers
/// the exact bytes that were signed.
async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServiceError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    state.services.checkout.handle_webhook(&body, signature).await?;
    Ok(success_response(json!({ "status": "processed" })))
}
