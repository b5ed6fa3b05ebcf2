use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::stock_adjustment::{
    self, AdjustmentReason, ApprovalStatus, Entity as StockAdjustment,
};
use crate::entities::stock_movement::MovementType;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::identity::IdentityService;
use crate::services::ledger::{LedgerDelta, StockLedgerService};
use crate::services::policy::{self, MovementPolicy};
use crate::services::MAX_CONFLICT_RETRIES;

/// Submission request for an ad-hoc quantity correction.
#[derive(Clone, Debug)]
pub struct SubmitAdjustment {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub quantity_delta: Decimal,
    pub reason: AdjustmentReason,
    pub notes: String,
    pub requested_by: Uuid,
}

/// Ad-hoc quantity corrections gated by the movement authorizer.
///
/// Below-threshold submissions are persisted already approved with the
/// ledger delta applied in the same transaction; above-threshold ones wait
/// for a second person.
#[derive(Clone)]
pub struct AdjustmentService {
    db: Arc<DatabaseConnection>,
    ledger: StockLedgerService,
    identity: IdentityService,
    events: EventSender,
    policy: MovementPolicy,
    min_note_len: usize,
}

impl AdjustmentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        ledger: StockLedgerService,
        identity: IdentityService,
        events: EventSender,
        policy: MovementPolicy,
        min_note_len: usize,
    ) -> Self {
        Self {
            db,
            ledger,
            identity,
            events,
            policy,
            min_note_len,
        }
    }

    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn submit(
        &self,
        request: SubmitAdjustment,
    ) -> Result<stock_adjustment::Model, ServiceError> {
        if request.notes.trim().len() < self.min_note_len {
            return Err(ServiceError::ValidationError(format!(
                "A justification of at least {} characters is mandatory for adjustments",
                self.min_note_len
            )));
        }
        if request.quantity_delta == Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Adjustment quantity delta must be non-zero".into(),
            ));
        }
        // Requester must exist even though submission needs no special role.
        self.identity.resolve(request.requested_by).await?;

        let unit_cost = self
            .ledger
            .unit_cost(request.item_id, request.location_id)
            .await?;
        let reference_missing = unit_cost.is_none();
        if reference_missing {
            warn!(item_id = %request.item_id, "adjustment references an item unknown to the catalog");
        }
        let valued_amount =
            request.quantity_delta.abs() * unit_cost.unwrap_or(Decimal::ZERO);

        let needs_approval =
            policy::requires_approval(valued_amount, self.policy.adjustment_approval_threshold);

        let mut attempt = 0;
        loop {
            match self
                .try_submit(&request, valued_amount, reference_missing, needs_approval)
                .await
            {
                Err(ServiceError::ConcurrentModification(id))
                    if attempt + 1 < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    warn!(record_id = %id, attempt, "adjustment submit lost version race; retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_submit(
        &self,
        request: &SubmitAdjustment,
        valued_amount: Decimal,
        reference_missing: bool,
        needs_approval: bool,
    ) -> Result<stock_adjustment::Model, ServiceError> {
        let now = Utc::now();
        let adjustment_id = Uuid::new_v4();
        let status = if needs_approval {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Approved
        };

        let txn = self.db.begin().await?;

        let model = stock_adjustment::ActiveModel {
            adjustment_id: Set(adjustment_id),
            item_id: Set(request.item_id),
            location_id: Set(request.location_id),
            quantity_delta: Set(request.quantity_delta),
            reason: Set(request.reason),
            notes: Set(request.notes.clone()),
            status: Set(status),
            requested_by: Set(request.requested_by),
            approved_by: Set(None),
            valued_amount: Set(valued_amount),
            self_approved: Set(false),
            reference_missing: Set(reference_missing),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        // At or below the threshold the record and its ledger effect are one
        // logical unit; a failed write rolls both back.
        let mut pending_events = Vec::new();
        if !needs_approval {
            let batch = self
                .ledger
                .apply_deltas_in(
                    &txn,
                    &[LedgerDelta {
                        item_id: request.item_id,
                        location_id: request.location_id,
                        quantity_delta: request.quantity_delta,
                        movement_type: MovementType::Adjustment,
                        reference_id: Some(adjustment_id),
                        reference_type: Some("stock_adjustment".into()),
                        expiry_date: None,
                    }],
                )
                .await?;
            pending_events = batch.events;
        }

        txn.commit().await?;

        for event in pending_events {
            self.events.send_or_log(event).await;
        }
        self.events
            .send_or_log(Event::AdjustmentSubmitted {
                adjustment_id,
                auto_approved: !needs_approval,
                valued_amount,
            })
            .await;

        info!(
            %adjustment_id,
            auto_approved = !needs_approval,
            %valued_amount,
            "adjustment submitted"
        );
        Ok(model)
    }

    /// Approves a pending adjustment and applies its delta, both in one
    /// transaction.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        adjustment_id: Uuid,
        approver_id: Uuid,
    ) -> Result<stock_adjustment::Model, ServiceError> {
        let approver = self.identity.require_approver(approver_id).await?;

        let mut attempt = 0;
        loop {
            match self.try_approve(adjustment_id, approver.operator_id).await {
                Err(ServiceError::ConcurrentModification(id))
                    if attempt + 1 < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    warn!(record_id = %id, attempt, "adjustment approval lost version race; retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_approve(
        &self,
        adjustment_id: Uuid,
        approver_id: Uuid,
    ) -> Result<stock_adjustment::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let adjustment = StockAdjustment::find_by_id(adjustment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adjustment {} not found", adjustment_id))
            })?;

        if adjustment.status != ApprovalStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Adjustment {} is {:?}; only pending adjustments can be approved",
                adjustment_id, adjustment.status
            )));
        }

        let self_approved = adjustment.requested_by == approver_id;
        if self_approved {
            // Not blocked, but always visible in the record and the log.
            warn!(%adjustment_id, operator = %approver_id, "self-approval of adjustment");
        }

        let batch = self
            .ledger
            .apply_deltas_in(
                &txn,
                &[LedgerDelta {
                    item_id: adjustment.item_id,
                    location_id: adjustment.location_id,
                    quantity_delta: adjustment.quantity_delta,
                    movement_type: MovementType::Adjustment,
                    reference_id: Some(adjustment_id),
                    reference_type: Some("stock_adjustment".into()),
                    expiry_date: None,
                }],
            )
            .await?;

        let mut active: stock_adjustment::ActiveModel = adjustment.into();
        active.status = Set(ApprovalStatus::Approved);
        active.approved_by = Set(Some(approver_id));
        active.self_approved = Set(self_approved);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        for event in batch.events {
            self.events.send_or_log(event).await;
        }
        self.events
            .send_or_log(Event::AdjustmentApproved {
                adjustment_id,
                approved_by: approver_id,
            })
            .await;

        Ok(updated)
    }

    /// Rejects a pending adjustment. Never touches the ledger.
    #[instrument(skip(self))]
    pub async fn reject(
        &self,
        adjustment_id: Uuid,
        approver_id: Uuid,
    ) -> Result<stock_adjustment::Model, ServiceError> {
        let approver = self.identity.require_approver(approver_id).await?;

        let adjustment = StockAdjustment::find_by_id(adjustment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adjustment {} not found", adjustment_id))
            })?;

        if adjustment.status != ApprovalStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Adjustment {} is {:?}; only pending adjustments can be rejected",
                adjustment_id, adjustment.status
            )));
        }

        let self_approved = adjustment.requested_by == approver.operator_id;

        let mut active: stock_adjustment::ActiveModel = adjustment.into();
        active.status = Set(ApprovalStatus::Rejected);
        active.approved_by = Set(Some(approver.operator_id));
        active.self_approved = Set(self_approved);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.events
            .send_or_log(Event::AdjustmentRejected {
                adjustment_id,
                rejected_by: approver.operator_id,
            })
            .await;

        Ok(updated)
    }

    pub async fn get(&self, adjustment_id: Uuid) -> Result<stock_adjustment::Model, ServiceError> {
        StockAdjustment::find_by_id(adjustment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Adjustment {} not found", adjustment_id))
            })
    }

    pub async fn list(
        &self,
        status: Option<ApprovalStatus>,
        location_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_adjustment::Model>, u64), ServiceError> {
        let mut query =
            StockAdjustment::find().order_by_desc(stock_adjustment::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(stock_adjustment::Column::Status.eq(status));
        }
        if let Some(location) = location_id {
            query = query.filter(stock_adjustment::Column::LocationId.eq(location));
        }

        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}
