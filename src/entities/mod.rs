pub mod address;
pub mod order;
pub mod payment_transaction;
pub mod status_check;
pub mod user;
pub mod wishlist;
