use axum::{routing::get, Json, Router};
use chrono::Duration;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod services;

use auth::{AuthConfig, AuthService};
use catalog::Catalog;
use config::AppConfig;
use errors::ServiceError;
use gateway::CheckoutGateway;
use handlers::AppServices;
use services::{
    AddressService, CheckoutService, OrderService, StatusCheckService, UserService,
    WishlistService,
};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

/// Wires services and state together. The gateway is optional so the rest of
/// the API keeps working without payment credentials.
pub fn build_state(
    config: AppConfig,
    db: DatabaseConnection,
    gateway: Option<Arc<dyn CheckoutGateway>>,
) -> Result<AppState, ServiceError> {
    let db = Arc::new(db);

    let auth = Arc::new(AuthService::new(
        AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            token_expiration: Duration::seconds(config.jwt_expiration as i64),
        },
        db.clone(),
    ));

    let tax_rate = Decimal::from_f64(config.default_tax_rate).ok_or_else(|| {
        ServiceError::Configuration(format!(
            "default_tax_rate is not representable: {}",
            config.default_tax_rate
        ))
    })?;

    let services = AppServices {
        users: Arc::new(UserService::new(db.clone(), auth.clone())),
        addresses: Arc::new(AddressService::new(db.clone())),
        wishlists: Arc::new(WishlistService::new(db.clone())),
        orders: Arc::new(OrderService::new(db.clone())),
        checkout: Arc::new(CheckoutService::new(
            db.clone(),
            gateway,
            config.default_currency.clone(),
            tax_rate,
        )),
        status_checks: Arc::new(StatusCheckService::new(db.clone())),
    };

    Ok(AppState {
        db,
        config,
        catalog: Arc::new(Catalog::builtin()),
        auth,
        services,
    })
}

/// Everything under the `/api` prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::status::hello))
        .nest("/status", handlers::status::status_routes())
        .nest("/auth", handlers::auth::auth_routes())
        .merge(handlers::products::product_routes())
        .nest("/wishlist", handlers::wishlist::wishlist_routes())
        .nest("/addresses", handlers::addresses::address_routes())
        .nest("/orders", handlers::orders::order_routes())
        .nest("/checkout", handlers::checkout::checkout_routes())
        .nest("/webhook", handlers::checkout::webhook_routes())
}

/// The full application router for a given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status::hello))
        .nest("/api", api_routes())
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .with_state(state)
}
