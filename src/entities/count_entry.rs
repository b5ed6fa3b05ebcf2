use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::stock_adjustment::ApprovalStatus;

/// Variance record produced by a physical count.
///
/// `system_quantity` is a snapshot of the stock record at count time;
/// approval is advisory and deliberately does not feed back into the ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "count_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entry_id: Uuid,
    /// None for ad-hoc counts not driven by a scheduled task.
    pub count_task_id: Option<Uuid>,
    pub item_id: Uuid,
    pub location_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub counted_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub system_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub variance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub variance_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub variance_value: Decimal,
    /// Operator-attention flag only; never gates approval.
    pub significant: bool,
    pub status: ApprovalStatus,
    pub counted_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub self_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::count_task::Entity",
        from = "Column::CountTaskId",
        to = "super::count_task::Column::TaskId"
    )]
    CountTask,
}

impl Related<super::count_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CountTask.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
