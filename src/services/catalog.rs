use std::sync::Arc;

use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::entities::item_master::{self, Entity as ItemMaster};
use crate::errors::ServiceError;

/// Read-only view onto the catalog boundary table. Item definitions are
/// authored elsewhere; this service only resolves them.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Looks an item up by id. Absence is not an error here; callers decide
    /// whether a missing reference is fatal or merely flagged.
    pub async fn item(&self, item_id: Uuid) -> Result<Option<item_master::Model>, ServiceError> {
        ItemMaster::find_by_id(item_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
