use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ledger mutation, for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    #[sea_orm(string_value = "purchase_receipt")]
    PurchaseReceipt,
}

/// Append-only audit record written alongside every stock record mutation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movement_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub movement_type: MovementType,
    /// The delta as requested by the workflow (pre-clamp).
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_delta: Decimal,
    /// Quantity on hand after the mutation was applied.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub resulting_quantity: Decimal,
    /// Workflow record that caused the movement (adjustment, transfer, PO).
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
