use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Transfer lifecycle. Orders only move forward; CANCELLED is reachable from
/// any state before COMPLETED.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// One manifest line of a transfer order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferLine {
    pub item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
}

/// Ordered manifest embedded in the order row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct TransferManifest(pub Vec<TransferLine>);

/// Multi-location stock movement order. Only the transition into COMPLETED
/// mutates the ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transfer_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub status: TransferStatus,
    #[sea_orm(column_type = "Json")]
    pub manifest: TransferManifest,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Total valued amount of the manifest, priced per line from the given
    /// lookup; lines without a known cost value at zero.
    pub fn valued_amount<F>(&self, unit_cost: F) -> Decimal
    where
        F: Fn(Uuid) -> Option<Decimal>,
    {
        self.manifest
            .0
            .iter()
            .map(|line| line.quantity * unit_cost(line.item_id).unwrap_or(Decimal::ZERO))
            .sum()
    }
}
