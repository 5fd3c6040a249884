use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entities::wishlist;
use crate::errors::ServiceError;
use crate::models::wishlist::{WishlistItem, WishlistItems};

/// Per-owner wishlist stored as a single row with a JSON item list.
pub struct WishlistService {
    db: Arc<DatabaseConnection>,
}

impl WishlistService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<wishlist::Model>, ServiceError> {
        let row = wishlist::Entity::find()
            .filter(wishlist::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?;
        Ok(row)
    }

    /// Items in insertion order; a user with no wishlist row has an empty list.
    #[instrument(skip(self))]
    pub async fn items(&self, user_id: Uuid) -> Result<WishlistItems, ServiceError> {
        Ok(self
            .find(user_id)
            .await?
            .map(|row| row.items)
            .unwrap_or_default())
    }

    /// Appends an item; adding a product that is already present is a no-op.
    #[instrument(skip(self, item), fields(product_id = item.product_id))]
    pub async fn add(&self, user_id: Uuid, item: WishlistItem) -> Result<WishlistItems, ServiceError> {
        match self.find(user_id).await? {
            Some(row) => {
                if row.items.contains(item.product_id) {
                    debug!("Product already on wishlist");
                    return Ok(row.items);
                }
                let mut items = row.items.clone();
                items.0.push(item);

                let mut active: wishlist::ActiveModel = row.into();
                active.items = Set(items.clone());
                active.updated_at = Set(Utc::now());
                active.update(self.db.as_ref()).await?;
                Ok(items)
            }
            None => {
                let items = WishlistItems(vec![item]);
                let model = wishlist::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    items: Set(items.clone()),
                    updated_at: Set(Utc::now()),
                };
                model.insert(self.db.as_ref()).await?;
                Ok(items)
            }
        }
    }

    /// Removes a product from the list; removing an absent product succeeds.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, product_id: u32) -> Result<WishlistItems, ServiceError> {
        let Some(row) = self.find(user_id).await? else {
            return Ok(WishlistItems::default());
        };

        let mut items = row.items.clone();
        items.0.retain(|item| item.product_id != product_id);
        if items == row.items {
            return Ok(items);
        }

        let mut active: wishlist::ActiveModel = row.into();
        active.items = Set(items.clone());
        active.updated_at = Set(Utc::now());
        active.update(self.db.as_ref()).await?;
        Ok(items)
    }
}
