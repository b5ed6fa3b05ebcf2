use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::purchase_order::{
    self, Entity as PurchaseOrder, PurchaseLine, PurchaseManifest, PurchaseStatus, QualityStatus,
    ReceivedLine, ReceivedManifest,
};
use crate::entities::stock_movement::MovementType;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::identity::IdentityService;
use crate::services::ledger::{LedgerDelta, StockLedgerService};
use crate::services::MAX_CONFLICT_RETRIES;

#[derive(Clone, Debug)]
pub struct CreatePurchaseOrder {
    pub supplier_name: String,
    pub location_id: Uuid,
    pub lines: Vec<PurchaseLine>,
    pub created_by: Uuid,
}

/// One receiving decision for a single ordered line.
#[derive(Clone, Debug)]
pub struct ReceiptLine {
    pub item_id: Uuid,
    pub received_quantity: Decimal,
    pub quality_status: QualityStatus,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Supplier replenishment workflow. Receiving is the only ledger-mutating
/// step and it credits exactly the accepted quantities.
#[derive(Clone)]
pub struct PurchasingService {
    db: Arc<DatabaseConnection>,
    ledger: StockLedgerService,
    identity: IdentityService,
    events: EventSender,
}

impl PurchasingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        ledger: StockLedgerService,
        identity: IdentityService,
        events: EventSender,
    ) -> Self {
        Self {
            db,
            ledger,
            identity,
            events,
        }
    }

    #[instrument(skip(self, request), fields(supplier = %request.supplier_name))]
    pub async fn create(
        &self,
        request: CreatePurchaseOrder,
    ) -> Result<purchase_order::Model, ServiceError> {
        if request.supplier_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Supplier name must not be empty".into(),
            ));
        }
        if request.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "Purchase order must contain at least one line".into(),
            ));
        }
        for line in &request.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Ordered quantity for item {} must be positive",
                    line.item_id
                )));
            }
            if line.unit_cost < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Unit cost for item {} must not be negative",
                    line.item_id
                )));
            }
        }
        self.identity.resolve(request.created_by).await?;

        let now = Utc::now();
        let model = purchase_order::ActiveModel {
            purchase_id: Set(Uuid::new_v4()),
            supplier_name: Set(request.supplier_name),
            location_id: Set(request.location_id),
            status: Set(PurchaseStatus::Draft),
            manifest: Set(PurchaseManifest(request.lines)),
            received_manifest: Set(None),
            created_by: Set(request.created_by),
            received_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(purchase_id = %model.purchase_id, "purchase order drafted");
        Ok(model)
    }

    /// Sends a draft to the supplier: DRAFT → ORDERED.
    #[instrument(skip(self))]
    pub async fn place(&self, purchase_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let order = self.get(purchase_id).await?;
        if order.status != PurchaseStatus::Draft {
            return Err(ServiceError::InvalidStatus(format!(
                "Purchase order {} is {:?}; only drafts can be placed",
                purchase_id, order.status
            )));
        }

        let updated = self
            .guarded_status_update(purchase_id, PurchaseStatus::Draft, PurchaseStatus::Ordered)
            .await?;

        self.events
            .send_or_log(Event::PurchaseOrderPlaced { purchase_id })
            .await;

        Ok(purchase_order::Model {
            status: PurchaseStatus::Ordered,
            updated_at: updated,
            ..order
        })
    }

    /// Records the receipt decision for an ordered PO. Lines that PASSED
    /// quality with a positive quantity are credited to the ledger in one
    /// atomic batch; FAILED and zero-quantity lines are kept in the
    /// received manifest for audit only. Manifest lines with no receipt
    /// decision are recorded as zero-received FAILED.
    #[instrument(skip(self, receipts))]
    pub async fn receive(
        &self,
        purchase_id: Uuid,
        receipts: Vec<ReceiptLine>,
        received_by: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        self.identity.resolve(received_by).await?;

        let mut attempt = 0;
        loop {
            match self.try_receive(purchase_id, &receipts, received_by).await {
                Err(ServiceError::ConcurrentModification(id))
                    if attempt + 1 < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    warn!(record_id = %id, attempt, "purchase receipt lost version race; retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_receive(
        &self,
        purchase_id: Uuid,
        receipts: &[ReceiptLine],
        received_by: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = PurchaseOrder::find_by_id(purchase_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", purchase_id))
            })?;

        if order.status != PurchaseStatus::Ordered {
            return Err(ServiceError::InvalidStatus(format!(
                "Purchase order {} is {:?}; only ordered POs can be received",
                purchase_id, order.status
            )));
        }

        for receipt in receipts {
            if !order.manifest.0.iter().any(|l| l.item_id == receipt.item_id) {
                return Err(ServiceError::ValidationError(format!(
                    "Item {} was not on purchase order {}",
                    receipt.item_id, purchase_id
                )));
            }
            if receipt.received_quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Received quantity for item {} must not be negative",
                    receipt.item_id
                )));
            }
        }

        let mut received_lines = Vec::with_capacity(order.manifest.0.len());
        let mut deltas = Vec::new();
        for line in &order.manifest.0 {
            let receipt = receipts.iter().find(|r| r.item_id == line.item_id);
            let (received_quantity, quality_status, expiry_date) = match receipt {
                Some(r) => (r.received_quantity, r.quality_status, r.expiry_date),
                None => (Decimal::ZERO, QualityStatus::Failed, None),
            };
            if received_quantity > line.quantity {
                return Err(ServiceError::ValidationError(format!(
                    "Received quantity {} exceeds ordered quantity {} for item {}",
                    received_quantity, line.quantity, line.item_id
                )));
            }

            if quality_status == QualityStatus::Passed && received_quantity > Decimal::ZERO {
                deltas.push(LedgerDelta {
                    item_id: line.item_id,
                    location_id: order.location_id,
                    quantity_delta: received_quantity,
                    movement_type: MovementType::PurchaseReceipt,
                    reference_id: Some(purchase_id),
                    reference_type: Some("purchase_order".into()),
                    expiry_date,
                });
            }

            received_lines.push(ReceivedLine {
                item_id: line.item_id,
                name: line.name.clone(),
                ordered_quantity: line.quantity,
                received_quantity,
                unit_cost: line.unit_cost,
                quality_status,
                expiry_date,
            });
        }

        let final_status = derive_receipt_status(&order.manifest.0, &received_lines);
        let accepted_lines = deltas.len();

        let batch = self.ledger.apply_deltas_in(&txn, &deltas).await?;

        let now = Utc::now();
        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(final_status);
        active.received_manifest = Set(Some(ReceivedManifest(received_lines)));
        active.received_by = Set(Some(received_by));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        for event in batch.events {
            self.events.send_or_log(event).await;
        }
        self.events
            .send_or_log(Event::PurchaseOrderReceived {
                purchase_id,
                final_status: final_status.to_string(),
                accepted_lines,
            })
            .await;

        info!(%purchase_id, status = ?final_status, accepted_lines, "purchase order received");
        Ok(updated)
    }

    /// Rejects an entire ordered PO: every line is recorded as
    /// zero-received FAILED and the ledger is untouched.
    #[instrument(skip(self))]
    pub async fn reject(
        &self,
        purchase_id: Uuid,
        rejected_by: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        self.identity.resolve(rejected_by).await?;

        let order = self.get(purchase_id).await?;
        if order.status != PurchaseStatus::Ordered {
            return Err(ServiceError::InvalidStatus(format!(
                "Purchase order {} is {:?}; only ordered POs can be rejected",
                purchase_id, order.status
            )));
        }

        let received_lines: Vec<ReceivedLine> = order
            .manifest
            .0
            .iter()
            .map(|line| ReceivedLine {
                item_id: line.item_id,
                name: line.name.clone(),
                ordered_quantity: line.quantity,
                received_quantity: Decimal::ZERO,
                unit_cost: line.unit_cost,
                quality_status: QualityStatus::Failed,
                expiry_date: None,
            })
            .collect();

        let now = Utc::now();
        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(PurchaseStatus::Rejected);
        active.received_manifest = Set(Some(ReceivedManifest(received_lines)));
        active.received_by = Set(Some(rejected_by));
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        self.events
            .send_or_log(Event::PurchaseOrderReceived {
                purchase_id,
                final_status: PurchaseStatus::Rejected.to_string(),
                accepted_lines: 0,
            })
            .await;

        Ok(updated)
    }

    /// Cancels a PO that has not yet been resolved by a receipt decision.
    #[instrument(skip(self))]
    pub async fn cancel(&self, purchase_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        let order = self.get(purchase_id).await?;
        match order.status {
            PurchaseStatus::Draft | PurchaseStatus::Ordered => {}
            other => {
                return Err(ServiceError::InvalidStatus(format!(
                    "Purchase order {} is {:?}; cannot cancel a resolved order",
                    purchase_id, other
                )))
            }
        }

        let updated_at = self
            .guarded_status_update(purchase_id, order.status, PurchaseStatus::Cancelled)
            .await?;

        Ok(purchase_order::Model {
            status: PurchaseStatus::Cancelled,
            updated_at,
            ..order
        })
    }

    pub async fn get(&self, purchase_id: Uuid) -> Result<purchase_order::Model, ServiceError> {
        PurchaseOrder::find_by_id(purchase_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", purchase_id))
            })
    }

    pub async fn list(
        &self,
        status: Option<PurchaseStatus>,
        location_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<purchase_order::Model>, u64), ServiceError> {
        let mut query = PurchaseOrder::find().order_by_desc(purchase_order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        if let Some(location) = location_id {
            query = query.filter(purchase_order::Column::LocationId.eq(location));
        }
        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    async fn guarded_status_update(
        &self,
        purchase_id: Uuid,
        from: PurchaseStatus,
        to: PurchaseStatus,
    ) -> Result<DateTime<Utc>, ServiceError> {
        let now = Utc::now();
        let result = PurchaseOrder::update_many()
            .col_expr(purchase_order::Column::Status, Expr::value(to))
            .col_expr(purchase_order::Column::UpdatedAt, Expr::value(now))
            .filter(purchase_order::Column::PurchaseId.eq(purchase_id))
            .filter(purchase_order::Column::Status.eq(from))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(purchase_id));
        }
        Ok(now)
    }
}

/// Resolves the receipt outcome for the whole order.
///
/// RECEIVED when every ordered line came back in full and passed quality,
/// REJECTED when nothing usable arrived at all, PARTIALLY_RECEIVED for
/// everything in between.
fn derive_receipt_status(
    ordered: &[PurchaseLine],
    received: &[ReceivedLine],
) -> PurchaseStatus {
    let any_accepted = received
        .iter()
        .any(|r| r.quality_status == QualityStatus::Passed && r.received_quantity > Decimal::ZERO);
    if !any_accepted {
        return PurchaseStatus::Rejected;
    }

    let complete = ordered.iter().all(|line| {
        received.iter().any(|r| {
            r.item_id == line.item_id
                && r.quality_status == QualityStatus::Passed
                && r.received_quantity == line.quantity
        })
    });
    if complete {
        PurchaseStatus::Received
    } else {
        PurchaseStatus::PartiallyReceived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ordered_line(item_id: Uuid, quantity: Decimal) -> PurchaseLine {
        PurchaseLine {
            item_id,
            name: "widget".into(),
            quantity,
            unit_cost: dec!(5),
        }
    }

    fn received_line(
        line: &PurchaseLine,
        received: Decimal,
        quality: QualityStatus,
    ) -> ReceivedLine {
        ReceivedLine {
            item_id: line.item_id,
            name: line.name.clone(),
            ordered_quantity: line.quantity,
            received_quantity: received,
            unit_cost: line.unit_cost,
            quality_status: quality,
            expiry_date: None,
        }
    }

    #[test]
    fn full_receipt_resolves_to_received() {
        let a = ordered_line(Uuid::new_v4(), dec!(10));
        let b = ordered_line(Uuid::new_v4(), dec!(4));
        let received = vec![
            received_line(&a, dec!(10), QualityStatus::Passed),
            received_line(&b, dec!(4), QualityStatus::Passed),
        ];
        assert_eq!(
            derive_receipt_status(&[a, b], &received),
            PurchaseStatus::Received
        );
    }

    #[test]
    fn short_receipt_resolves_to_partially_received() {
        let a = ordered_line(Uuid::new_v4(), dec!(10));
        let received = vec![received_line(&a, dec!(6), QualityStatus::Passed)];
        assert_eq!(
            derive_receipt_status(&[a], &received),
            PurchaseStatus::PartiallyReceived
        );
    }

    #[test]
    fn failed_quality_makes_full_count_partial() {
        let a = ordered_line(Uuid::new_v4(), dec!(10));
        let b = ordered_line(Uuid::new_v4(), dec!(2));
        let received = vec![
            received_line(&a, dec!(10), QualityStatus::Passed),
            received_line(&b, dec!(2), QualityStatus::Failed),
        ];
        assert_eq!(
            derive_receipt_status(&[a, b], &received),
            PurchaseStatus::PartiallyReceived
        );
    }

    #[test]
    fn nothing_usable_resolves_to_rejected() {
        let a = ordered_line(Uuid::new_v4(), dec!(10));
        let received_failed = vec![received_line(&a, dec!(10), QualityStatus::Failed)];
        assert_eq!(
            derive_receipt_status(&[a.clone()], &received_failed),
            PurchaseStatus::Rejected
        );

        let received_zero = vec![received_line(&a, dec!(0), QualityStatus::Passed)];
        assert_eq!(
            derive_receipt_status(&[a], &received_zero),
            PurchaseStatus::Rejected
        );
    }
}
