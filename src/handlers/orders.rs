use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::success_response;
use crate::auth::CurrentUser;
use crate::errors::ServiceError;
use crate::AppState;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
}

async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_for_user(user.id).await?;
    Ok(success_response(json!({ "orders": orders })))
}

async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_for_user(user.id, id).await?;
    Ok(success_response(order))
}
