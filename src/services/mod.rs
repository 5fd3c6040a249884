pub mod addresses;
pub mod checkout;
pub mod orders;
pub mod status_checks;
pub mod users;
pub mod wishlists;

pub use addresses::AddressService;
pub use checkout::CheckoutService;
pub use orders::OrderService;
pub use status_checks::StatusCheckService;
pub use users::UserService;
pub use wishlists::WishlistService;
