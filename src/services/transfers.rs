use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::StockCheckPolicy;
use crate::entities::stock_movement::MovementType;
use crate::entities::transfer_order::{
    self, Entity as TransferOrder, TransferLine, TransferManifest, TransferStatus,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::catalog::CatalogService;
use crate::services::identity::IdentityService;
use crate::services::ledger::{LedgerDelta, StockLedgerService};
use crate::services::policy::{self, MovementPolicy};
use crate::services::MAX_CONFLICT_RETRIES;

/// Creation request: line items to move between two locations.
#[derive(Clone, Debug)]
pub struct CreateTransfer {
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub lines: Vec<(Uuid, Decimal)>,
    pub requested_by: Uuid,
    pub notes: Option<String>,
}

/// Multi-location stock movement orders with a draft → approval →
/// fulfillment lifecycle. Only the transition into COMPLETED mutates the
/// ledger, and it applies the whole manifest as one atomic batch.
#[derive(Clone)]
pub struct TransferService {
    db: Arc<DatabaseConnection>,
    ledger: StockLedgerService,
    catalog: CatalogService,
    identity: IdentityService,
    events: EventSender,
    policy: MovementPolicy,
}

impl TransferService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        ledger: StockLedgerService,
        catalog: CatalogService,
        identity: IdentityService,
        events: EventSender,
        policy: MovementPolicy,
    ) -> Self {
        Self {
            db,
            ledger,
            catalog,
            identity,
            events,
            policy,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreateTransfer,
    ) -> Result<transfer_order::Model, ServiceError> {
        if request.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "Transfer manifest must contain at least one line".into(),
            ));
        }
        if request.source_location_id == request.destination_location_id {
            return Err(ServiceError::ValidationError(
                "Transfer source and destination must differ".into(),
            ));
        }
        self.identity.resolve(request.requested_by).await?;

        let mut manifest = Vec::with_capacity(request.lines.len());
        for (item_id, quantity) in &request.lines {
            if *quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Transfer quantity for item {} must be positive",
                    item_id
                )));
            }

            let source = self.ledger.get(*item_id, request.source_location_id).await?;

            if self.policy.stock_check == StockCheckPolicy::BlockAtCreation {
                let available = source
                    .as_ref()
                    .map(|r| r.available_quantity())
                    .unwrap_or(Decimal::ZERO);
                if available < *quantity {
                    return Err(ServiceError::InsufficientStock(format!(
                        "Insufficient stock at source for item {}: available {}, requested {}",
                        item_id, available, quantity
                    )));
                }
            }

            let name = match source {
                Some(record) => record.item_name,
                None => match self.catalog.item(*item_id).await? {
                    Some(item) => item.name,
                    None => {
                        warn!(%item_id, "transfer line references an item unknown to the catalog");
                        format!("unknown item {}", item_id)
                    }
                },
            };

            manifest.push(TransferLine {
                item_id: *item_id,
                name,
                quantity: *quantity,
            });
        }

        let now = Utc::now();
        let model = transfer_order::ActiveModel {
            transfer_id: Set(Uuid::new_v4()),
            source_location_id: Set(request.source_location_id),
            destination_location_id: Set(request.destination_location_id),
            status: Set(TransferStatus::Draft),
            manifest: Set(TransferManifest(manifest)),
            requested_by: Set(request.requested_by),
            approved_by: Set(None),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(transfer_id = %model.transfer_id, "transfer order created");
        Ok(model)
    }

    /// Moves a draft forward: above the transfer threshold it parks in
    /// PENDING_APPROVAL, otherwise it is approved immediately.
    #[instrument(skip(self))]
    pub async fn submit(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        let order = self.get(transfer_id).await?;
        if order.status != TransferStatus::Draft {
            return Err(ServiceError::InvalidStatus(format!(
                "Transfer {} is {:?}; only drafts can be submitted",
                transfer_id, order.status
            )));
        }

        let mut costs = HashMap::new();
        for line in &order.manifest.0 {
            let cost = self
                .ledger
                .unit_cost(line.item_id, order.source_location_id)
                .await?;
            costs.insert(line.item_id, cost);
        }
        let valued_amount = order.valued_amount(|item| costs.get(&item).copied().flatten());

        let target = if policy::requires_approval(valued_amount, self.policy.transfer_approval_threshold)
        {
            TransferStatus::PendingApproval
        } else {
            TransferStatus::Approved
        };

        self.transition(transfer_id, &[TransferStatus::Draft], target, None)
            .await
    }

    /// Second-person approval of a parked transfer.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        transfer_id: Uuid,
        approver_id: Uuid,
    ) -> Result<transfer_order::Model, ServiceError> {
        let approver = self.identity.require_approver(approver_id).await?;
        let order = self.get(transfer_id).await?;
        if order.requested_by == approver.operator_id {
            warn!(%transfer_id, operator = %approver_id, "self-approval of transfer");
        }
        self.transition(
            transfer_id,
            &[TransferStatus::PendingApproval],
            TransferStatus::Approved,
            Some(approver.operator_id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn dispatch(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        self.transition(
            transfer_id,
            &[TransferStatus::Approved],
            TransferStatus::InTransit,
            None,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn receive(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        self.transition(
            transfer_id,
            &[TransferStatus::InTransit],
            TransferStatus::Received,
            None,
        )
        .await
    }

    /// Completes a received transfer: decrements every manifest line at the
    /// source and increments (or creates) the destination record, all lines
    /// in one transaction.
    #[instrument(skip(self))]
    pub async fn complete(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        let mut attempt = 0;
        loop {
            match self.try_complete(transfer_id).await {
                Err(ServiceError::ConcurrentModification(id))
                    if attempt + 1 < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    warn!(record_id = %id, attempt, "transfer completion lost version race; retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_complete(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = TransferOrder::find_by_id(transfer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", transfer_id)))?;

        if order.status != TransferStatus::Received {
            return Err(ServiceError::InvalidStatus(format!(
                "Transfer {} is {:?}; only received transfers can be completed",
                transfer_id, order.status
            )));
        }

        if self.policy.stock_check == StockCheckPolicy::DeferToCompletion {
            // Availability is read through the open transaction so the
            // precondition and the version-checked writes share one snapshot.
            for line in &order.manifest.0 {
                let record = self
                    .ledger
                    .get_in(&txn, line.item_id, order.source_location_id)
                    .await?;
                let available = record
                    .map(|r| r.available_quantity())
                    .unwrap_or(Decimal::ZERO);
                if available < line.quantity {
                    return Err(ServiceError::InsufficientStock(format!(
                        "Insufficient stock at source for item {}: available {}, requested {}",
                        line.item_id, available, line.quantity
                    )));
                }
            }
        }

        let mut deltas = Vec::with_capacity(order.manifest.0.len() * 2);
        for line in &order.manifest.0 {
            deltas.push(LedgerDelta {
                item_id: line.item_id,
                location_id: order.source_location_id,
                quantity_delta: -line.quantity,
                movement_type: MovementType::TransferOut,
                reference_id: Some(transfer_id),
                reference_type: Some("transfer_order".into()),
                expiry_date: None,
            });
            deltas.push(LedgerDelta {
                item_id: line.item_id,
                location_id: order.destination_location_id,
                quantity_delta: line.quantity,
                movement_type: MovementType::TransferIn,
                reference_id: Some(transfer_id),
                reference_type: Some("transfer_order".into()),
                expiry_date: None,
            });
        }

        let batch = self.ledger.apply_deltas_in(&txn, &deltas).await?;

        let now = Utc::now();
        let result = TransferOrder::update_many()
            .col_expr(
                transfer_order::Column::Status,
                Expr::value(TransferStatus::Completed),
            )
            .col_expr(transfer_order::Column::UpdatedAt, Expr::value(now))
            .filter(transfer_order::Column::TransferId.eq(transfer_id))
            .filter(transfer_order::Column::Status.eq(TransferStatus::Received))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(transfer_id));
        }

        txn.commit().await?;

        for event in batch.events {
            self.events.send_or_log(event).await;
        }
        self.events
            .send_or_log(Event::TransferCompleted {
                transfer_id,
                line_count: order.manifest.0.len(),
            })
            .await;

        info!(%transfer_id, lines = order.manifest.0.len(), "transfer completed");

        Ok(transfer_order::Model {
            status: TransferStatus::Completed,
            updated_at: now,
            ..order
        })
    }

    /// Cancels an order in any state prior to COMPLETED.
    #[instrument(skip(self))]
    pub async fn cancel(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        self.transition(
            transfer_id,
            &[
                TransferStatus::Draft,
                TransferStatus::PendingApproval,
                TransferStatus::Approved,
                TransferStatus::InTransit,
                TransferStatus::Received,
            ],
            TransferStatus::Cancelled,
            None,
        )
        .await
    }

    pub async fn get(&self, transfer_id: Uuid) -> Result<transfer_order::Model, ServiceError> {
        TransferOrder::find_by_id(transfer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", transfer_id)))
    }

    pub async fn list(
        &self,
        status: Option<TransferStatus>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<transfer_order::Model>, u64), ServiceError> {
        let mut query = TransferOrder::find().order_by_desc(transfer_order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(transfer_order::Column::Status.eq(status));
        }
        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Guarded forward transition: the row must still be in one of
    /// `allowed_from` when the update lands, otherwise the caller is told
    /// what state the order is actually in.
    async fn transition(
        &self,
        transfer_id: Uuid,
        allowed_from: &[TransferStatus],
        target: TransferStatus,
        approved_by: Option<Uuid>,
    ) -> Result<transfer_order::Model, ServiceError> {
        let order = self.get(transfer_id).await?;
        if !allowed_from.contains(&order.status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Transfer {} is {:?}; cannot transition to {:?}",
                transfer_id, order.status, target
            )));
        }

        let now = Utc::now();
        let mut update = TransferOrder::update_many()
            .col_expr(transfer_order::Column::Status, Expr::value(target))
            .col_expr(transfer_order::Column::UpdatedAt, Expr::value(now));
        if let Some(approver) = approved_by {
            update = update.col_expr(transfer_order::Column::ApprovedBy, Expr::value(approver));
        }
        let result = update
            .filter(transfer_order::Column::TransferId.eq(transfer_id))
            .filter(transfer_order::Column::Status.eq(order.status))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(transfer_id));
        }

        self.events
            .send_or_log(Event::TransferStatusChanged {
                transfer_id,
                old_status: order.status.to_string(),
                new_status: target.to_string(),
            })
            .await;

        Ok(transfer_order::Model {
            status: target,
            approved_by: approved_by.or(order.approved_by),
            updated_at: now,
            ..order
        })
    }
}
