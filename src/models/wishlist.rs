use rust_decimal::Decimal;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product snapshot kept on the wishlist so the list renders without a
/// catalog lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub product_id: u32,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Ordered JSON column wrapper; insertion order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct WishlistItems(pub Vec<WishlistItem>);

impl WishlistItems {
    pub fn contains(&self, product_id: u32) -> bool {
        self.0.iter().any(|item| item.product_id == product_id)
    }
}
