use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::success_response;
use crate::catalog::{Product, SearchFilters};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub products: Vec<Product>,
    pub total: usize,
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/products/:id", get(get_product))
        .route("/categories", get(list_categories))
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let products: Vec<&Product> = state.catalog.list(query.category.as_deref());
    Ok(success_response(
        serde_json::json!({ "products": products }),
    ))
}

/// Text search with category and price-range filters.
#[utoipa::path(
    get,
    path = "/api/products/search",
    params(
        ("q" = Option<String>, Query, description = "Text matched against either product name"),
        ("category" = Option<String>, Query, description = "Category id"),
        ("min_price" = Option<f64>, Query, description = "Inclusive lower price bound"),
        ("max_price" = Option<f64>, Query, description = "Inclusive upper price bound")
    ),
    responses((status = 200, description = "Matching products", body = SearchResponse)),
    tag = "catalog"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(filters): Query<SearchFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let products: Vec<Product> = state.catalog.search(&filters).into_iter().cloned().collect();
    let total = products.len();
    Ok(success_response(SearchResponse { products, total }))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .catalog
        .get(id)
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
    Ok(success_response(product.clone()))
}

async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    success_response(serde_json::json!({ "categories": state.catalog.categories() }))
}
