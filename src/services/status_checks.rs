use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::status_check;
use crate::errors::ServiceError;

const STATUS_CHECK_LIMIT: u64 = 1000;

/// Client liveness pings.
pub struct StatusCheckService {
    db: Arc<DatabaseConnection>,
}

impl StatusCheckService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn record(&self, client_name: String) -> Result<status_check::Model, ServiceError> {
        let model = status_check::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_name: Set(client_name),
            timestamp: Set(Utc::now()),
        };
        let saved = model.insert(self.db.as_ref()).await?;
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<status_check::Model>, ServiceError> {
        let checks = status_check::Entity::find()
            .order_by_desc(status_check::Column::Timestamp)
            .limit(STATUS_CHECK_LIMIT)
            .all(self.db.as_ref())
            .await?;
        Ok(checks)
    }
}
