use utoipa::OpenApi;

use crate::catalog::{Category, Product};
use crate::errors::ErrorResponse;
use crate::handlers::auth::{TokenResponse, UserProfile};
use crate::handlers::products::SearchResponse;
use crate::models::cart::{CartItem, CartItems, ShippingAddress};
use crate::models::status::{CheckoutStatus, PaymentStatus};
use crate::models::wishlist::{WishlistItem, WishlistItems};
use crate::services::checkout::{
    CheckoutStatusResponse, CreateCheckoutRequest, CreateCheckoutResponse,
};
use crate::services::users::{LoginRequest, RegisterRequest};

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "souq-api",
        description = "E-commerce backend: accounts, catalog, wishlist, addresses and Stripe-hosted checkout"
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::products::search_products,
        crate::handlers::checkout::create_session,
        crate::handlers::checkout::session_status,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        UserProfile,
        Product,
        Category,
        SearchResponse,
        CartItem,
        CartItems,
        ShippingAddress,
        WishlistItem,
        WishlistItems,
        CheckoutStatus,
        PaymentStatus,
        CreateCheckoutRequest,
        CreateCheckoutResponse,
        CheckoutStatusResponse,
        ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and profiles"),
        (name = "catalog", description = "Product catalog"),
        (name = "checkout", description = "Hosted checkout sessions")
    )
)]
pub struct ApiDoc;
