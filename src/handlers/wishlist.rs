use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

use super::common::success_response;
use crate::auth::CurrentUser;
use crate::errors::ServiceError;
use crate::models::wishlist::WishlistItem;
use crate::AppState;

pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wishlist))
        .route("/add", post(add_to_wishlist))
        .route("/:product_id", delete(remove_from_wishlist))
}

async fn get_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.wishlists.items(user.id).await?;
    Ok(success_response(json!({ "items": items })))
}

async fn add_to_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(item): Json<WishlistItem>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.wishlists.add(user.id, item).await?;
    Ok(success_response(json!({
        "message": "Added to wishlist",
        "items": items,
    })))
}

async fn remove_from_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<u32>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.wishlists.remove(user.id, product_id).await?;
    Ok(success_response(json!({
        "message": "Removed from wishlist",
        "items": items,
    })))
}
