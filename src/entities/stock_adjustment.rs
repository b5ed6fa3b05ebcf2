use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval state shared by adjustments and count entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Why the quantity was corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    #[sea_orm(string_value = "damage")]
    Damage,
    #[sea_orm(string_value = "theft")]
    Theft,
    #[sea_orm(string_value = "counting_error")]
    CountingError,
    #[sea_orm(string_value = "gift")]
    Gift,
    #[sea_orm(string_value = "sample")]
    Sample,
    #[sea_orm(string_value = "expiry")]
    Expiry,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Ad-hoc quantity correction request.
///
/// `valued_amount` (|delta| x unit cost) decides whether the record needs a
/// second-person approval; at or below the threshold it is created already
/// approved with the ledger delta applied in the same transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub adjustment_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_delta: Decimal,
    pub reason: AdjustmentReason,
    /// Mandatory free-text justification.
    pub notes: String,
    pub status: ApprovalStatus,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub valued_amount: Decimal,
    /// Set when requester and approver turned out to be the same operator.
    pub self_approved: bool,
    /// Set when the item could not be resolved against the catalog at
    /// submission time; the record is kept for audit.
    pub reference_missing: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
