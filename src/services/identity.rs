use std::sync::Arc;

use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::entities::operator::{self, Entity as Operator};
use crate::errors::ServiceError;
use crate::services::policy;

/// Read-only view onto the identity boundary table (operator id → name,
/// role). Authentication itself happens upstream.
#[derive(Clone)]
pub struct IdentityService {
    db: Arc<DatabaseConnection>,
}

impl IdentityService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn resolve(&self, operator_id: Uuid) -> Result<operator::Model, ServiceError> {
        Operator::find_by_id(operator_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Operator {} not found", operator_id)))
    }

    /// Resolves the operator and enforces the approval role gate
    /// (Manager/Admin only).
    pub async fn require_approver(
        &self,
        operator_id: Uuid,
    ) -> Result<operator::Model, ServiceError> {
        let op = self.resolve(operator_id).await?;
        if !policy::can_approve(op.role) {
            return Err(ServiceError::Forbidden(format!(
                "Operator {} has role {:?}; approval requires Manager or Admin",
                operator_id, op.role
            )));
        }
        Ok(op)
    }
}
