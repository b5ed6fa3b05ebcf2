use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authoritative per-(item, location) quantity record.
///
/// Owned exclusively by the stock ledger service; workflows never write
/// quantity columns directly. `version` backs the optimistic-concurrency
/// check that serializes mutations per record.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub record_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    /// Display attributes cloned from the catalog at creation time.
    pub item_name: String,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_on_hand: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub reserved_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub damaged_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub min_threshold: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub max_threshold: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_cost: Decimal,
    pub expiry_date: Option<DateTime<Utc>>,
    pub last_movement_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item_master::Entity",
        from = "Column::ItemId",
        to = "super::item_master::Column::ItemId"
    )]
    ItemMaster,
}

impl Related<super::item_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemMaster.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Quantity actually sellable/movable: on-hand minus reserved and
    /// damaged, floored at zero.
    pub fn available_quantity(&self) -> Decimal {
        (self.quantity_on_hand - self.reserved_quantity - self.damaged_quantity)
            .max(Decimal::ZERO)
    }
}
