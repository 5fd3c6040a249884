pub mod cart;
pub mod status;
pub mod wishlist;
