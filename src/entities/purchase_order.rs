use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Purchase order lifecycle. The receipt decision resolves an ORDERED order
/// into exactly one of RECEIVED / PARTIALLY_RECEIVED / REJECTED.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "ordered")]
    Ordered,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "partially_received")]
    PartiallyReceived,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Per-line quality decision made at receiving time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    Passed,
    Failed,
}

/// One ordered line of a purchase order manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PurchaseManifest(pub Vec<PurchaseLine>);

/// An ordered line annotated with the receipt outcome. FAILED or
/// zero-quantity lines stay here for audit but never touch the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceivedLine {
    pub item_id: Uuid,
    pub name: String,
    pub ordered_quantity: Decimal,
    pub received_quantity: Decimal,
    pub unit_cost: Decimal,
    pub quality_status: QualityStatus,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ReceivedManifest(pub Vec<ReceivedLine>);

/// Supplier replenishment order for one destination location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub purchase_id: Uuid,
    pub supplier_name: String,
    pub location_id: Uuid,
    pub status: PurchaseStatus,
    #[sea_orm(column_type = "Json")]
    pub manifest: PurchaseManifest,
    #[sea_orm(column_type = "Json", nullable)]
    pub received_manifest: Option<ReceivedManifest>,
    pub created_by: Uuid,
    pub received_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
