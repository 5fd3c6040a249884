use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::{created_response, message_response, success_response};
use crate::auth::CurrentUser;
use crate::errors::ServiceError;
use crate::services::addresses::CreateAddressRequest;
use crate::AppState;

pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/:id", delete(delete_address))
}

async fn list_addresses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let addresses = state.services.addresses.list(user.id).await?;
    Ok(success_response(json!({ "addresses": addresses })))
}

async fn create_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateAddressRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let address = state.services.addresses.create(user.id, request).await?;
    Ok(created_response(address))
}

async fn delete_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.addresses.delete(user.id, id).await?;
    Ok(message_response("Address deleted"))
}
