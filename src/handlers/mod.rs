use std::sync::Arc;

use crate::services::{
    AddressService, CheckoutService, OrderService, StatusCheckService, UserService,
    WishlistService,
};

pub mod addresses;
pub mod auth;
pub mod checkout;
pub mod common;
pub mod orders;
pub mod products;
pub mod status;
pub mod wishlist;

/// Service handles shared by every handler through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub addresses: Arc<AddressService>,
    pub wishlists: Arc<WishlistService>,
    pub orders: Arc<OrderService>,
    pub checkout: Arc<CheckoutService>,
    pub status_checks: Arc<StatusCheckService>,
}
