use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{created_response, success_response};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStatusCheckRequest {
    #[validate(length(min = 1))]
    pub client_name: String,
}

pub fn status_routes() -> Router<AppState> {
    Router::new().route("/", get(list_status_checks).post(create_status_check))
}

pub async fn hello() -> impl IntoResponse {
    success_response(json!({ "message": "Hello World" }))
}

async fn create_status_check(
    State(state): State<AppState>,
    Json(request): Json<CreateStatusCheckRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;
    let check = state
        .services
        .status_checks
        .record(request.client_name)
        .await?;
    Ok(created_response(check))
}

async fn list_status_checks(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let checks = state.services.status_checks.list().await?;
    Ok(success_response(checks))
}
