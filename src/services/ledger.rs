use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::entities::{
    item_master::{self, Entity as ItemMaster},
    stock_movement::{self, Entity as StockMovement, MovementType},
    stock_record::{self, Entity as StockRecord},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::MAX_CONFLICT_RETRIES;

/// One requested mutation of a (item, location) stock record.
#[derive(Clone, Debug)]
pub struct LedgerDelta {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub quantity_delta: Decimal,
    pub movement_type: MovementType,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    /// Stamped onto the record when the delta introduces dated stock
    /// (purchase receipts).
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Result of applying a batch inside a caller-owned transaction. Events must
/// be emitted by the caller only after its transaction commits.
pub struct AppliedBatch {
    pub records: Vec<stock_record::Model>,
    pub events: Vec<Event>,
}

/// The authoritative owner of all stock record mutation.
///
/// Every quantity write goes through `apply_deltas_in`: one transaction per
/// logical operation, an optimistic version check per record, and an
/// append-only movement row per delta. Quantities are clamped at a floor of
/// zero rather than rejected; the absorbed shortfall is logged and emitted
/// as an event.
#[derive(Clone)]
pub struct StockLedgerService {
    db: Arc<DatabaseConnection>,
    events: EventSender,
}

impl StockLedgerService {
    pub fn new(db: Arc<DatabaseConnection>, events: EventSender) -> Self {
        Self { db, events }
    }

    pub async fn get(
        &self,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<stock_record::Model>, ServiceError> {
        self.get_in(&*self.db, item_id, location_id).await
    }

    /// Reads a record through the caller's connection, so a workflow holding
    /// a transaction sees the same snapshot its writes will be checked
    /// against.
    pub async fn get_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<stock_record::Model>, ServiceError> {
        StockRecord::find()
            .filter(stock_record::Column::ItemId.eq(item_id))
            .filter(stock_record::Column::LocationId.eq(location_id))
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Lists stock records, optionally narrowed to an item and/or location.
    pub async fn list(
        &self,
        item_id: Option<Uuid>,
        location_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_record::Model>, u64), ServiceError> {
        let mut query = StockRecord::find().order_by_asc(stock_record::Column::ItemName);
        if let Some(item) = item_id {
            query = query.filter(stock_record::Column::ItemId.eq(item));
        }
        if let Some(location) = location_id {
            query = query.filter(stock_record::Column::LocationId.eq(location));
        }

        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Movement audit trail for one (item, location), newest first.
    pub async fn movements(
        &self,
        item_id: Uuid,
        location_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let paginator = StockMovement::find()
            .filter(stock_movement::Column::ItemId.eq(item_id))
            .filter(stock_movement::Column::LocationId.eq(location_id))
            .order_by_desc(stock_movement::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Quantity available for movement at a location; zero when the record
    /// does not exist.
    pub async fn available_quantity(
        &self,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        Ok(self
            .get(item_id, location_id)
            .await?
            .map(|r| r.available_quantity())
            .unwrap_or(Decimal::ZERO))
    }

    /// Applies a single delta in its own transaction.
    #[instrument(skip(self))]
    pub async fn apply_delta(
        &self,
        delta: LedgerDelta,
    ) -> Result<stock_record::Model, ServiceError> {
        let mut records = self.apply_deltas(vec![delta]).await?;
        records
            .pop()
            .ok_or_else(|| ServiceError::InternalError("empty ledger batch result".into()))
    }

    /// Applies a batch of deltas as one atomic unit, retrying the whole
    /// batch when an optimistic version check loses a race.
    #[instrument(skip(self, deltas), fields(lines = deltas.len()))]
    pub async fn apply_deltas(
        &self,
        deltas: Vec<LedgerDelta>,
    ) -> Result<Vec<stock_record::Model>, ServiceError> {
        let mut attempt = 0;
        loop {
            let txn = self.db.begin().await?;
            match self.apply_deltas_in(&txn, &deltas).await {
                Ok(batch) => {
                    txn.commit().await?;
                    for event in batch.events {
                        self.events.send_or_log(event).await;
                    }
                    return Ok(batch.records);
                }
                Err(ServiceError::ConcurrentModification(id))
                    if attempt + 1 < MAX_CONFLICT_RETRIES =>
                {
                    let _ = txn.rollback().await;
                    attempt += 1;
                    warn!(record_id = %id, attempt, "ledger batch lost version race; retrying");
                }
                Err(e) => {
                    let _ = txn.rollback().await;
                    return Err(e);
                }
            }
        }
    }

    /// Applies a batch inside a caller-owned transaction. All lines succeed
    /// or the caller's transaction must be rolled back; a lost version race
    /// surfaces as `ConcurrentModification` so the caller can retry its
    /// whole logical operation. A zero delta is rejected; every workflow
    /// producing deltas filters those out before they get here.
    pub async fn apply_deltas_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        deltas: &[LedgerDelta],
    ) -> Result<AppliedBatch, ServiceError> {
        let now = Utc::now();
        let mut records = Vec::with_capacity(deltas.len());
        let mut events = Vec::new();

        for delta in deltas {
            if delta.quantity_delta == Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Ledger delta for item {} must be non-zero",
                    delta.item_id
                )));
            }

            let record = match self.get_in(conn, delta.item_id, delta.location_id).await? {
                Some(existing) => existing,
                None => {
                    self.create_record_in(conn, delta.item_id, delta.location_id, delta.expiry_date)
                        .await?
                }
            };

            let raw_quantity = record.quantity_on_hand + delta.quantity_delta;
            let new_quantity = raw_quantity.max(Decimal::ZERO);
            if raw_quantity < Decimal::ZERO {
                warn!(
                    item_id = %delta.item_id,
                    location_id = %delta.location_id,
                    on_hand = %record.quantity_on_hand,
                    delta = %delta.quantity_delta,
                    "delta would drive quantity negative; clamping at zero"
                );
                events.push(Event::StockClampedAtZero {
                    item_id: delta.item_id,
                    location_id: delta.location_id,
                    requested_delta: delta.quantity_delta,
                    absorbed_shortfall: -raw_quantity,
                });
            }

            let mut update = StockRecord::update_many()
                .col_expr(stock_record::Column::QuantityOnHand, Expr::value(new_quantity))
                .col_expr(stock_record::Column::Version, Expr::value(record.version + 1))
                .col_expr(stock_record::Column::LastMovementAt, Expr::value(now))
                .col_expr(stock_record::Column::UpdatedAt, Expr::value(now));
            if let Some(expiry) = delta.expiry_date {
                update = update.col_expr(stock_record::Column::ExpiryDate, Expr::value(expiry));
            }
            let result = update
                .filter(stock_record::Column::RecordId.eq(record.record_id))
                .filter(stock_record::Column::Version.eq(record.version))
                .exec(conn)
                .await?;

            if result.rows_affected == 0 {
                return Err(ServiceError::ConcurrentModification(record.record_id));
            }

            stock_movement::ActiveModel {
                movement_id: Set(Uuid::new_v4()),
                item_id: Set(delta.item_id),
                location_id: Set(delta.location_id),
                movement_type: Set(delta.movement_type),
                quantity_delta: Set(delta.quantity_delta),
                resulting_quantity: Set(new_quantity),
                reference_id: Set(delta.reference_id),
                reference_type: Set(delta.reference_type.clone()),
                created_at: Set(now),
            }
            .insert(conn)
            .await?;

            events.push(Event::StockUpdated {
                item_id: delta.item_id,
                location_id: delta.location_id,
                quantity_delta: delta.quantity_delta,
                new_quantity,
            });

            records.push(stock_record::Model {
                quantity_on_hand: new_quantity,
                version: record.version + 1,
                last_movement_at: Some(now),
                updated_at: now,
                expiry_date: delta.expiry_date.or(record.expiry_date),
                ..record
            });
        }

        Ok(AppliedBatch { records, events })
    }

    /// Returns the record for (item, location), creating it when absent.
    /// Attributes are cloned from a sibling record of the same item at
    /// another location, falling back to the catalog.
    pub async fn create_if_absent(
        &self,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<stock_record::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let record = match self.get_in(&txn, item_id, location_id).await? {
            Some(existing) => existing,
            None => self.create_record_in(&txn, item_id, location_id, None).await?,
        };
        txn.commit().await?;
        Ok(record)
    }

    async fn create_record_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: Uuid,
        location_id: Uuid,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<stock_record::Model, ServiceError> {
        // No record at this location yet; any hit on the item is a sibling.
        let sibling = StockRecord::find()
            .filter(stock_record::Column::ItemId.eq(item_id))
            .one(conn)
            .await?;

        let (item_name, unit, unit_cost, min_threshold, max_threshold) = match sibling {
            Some(s) => (s.item_name, s.unit, s.unit_cost, s.min_threshold, s.max_threshold),
            None => match ItemMaster::find_by_id(item_id).one(conn).await? {
                Some(item) => (item.name, item.unit, item.unit_cost, None, None),
                None => {
                    // Reference drift: keep going with a placeholder so the
                    // movement record survives for audit.
                    warn!(%item_id, "item missing from catalog; creating placeholder record");
                    (
                        format!("unknown item {}", item_id),
                        "unit".to_string(),
                        Decimal::ZERO,
                        None,
                        None,
                    )
                }
            },
        };

        let now = Utc::now();
        let model = stock_record::ActiveModel {
            record_id: Set(Uuid::new_v4()),
            item_id: Set(item_id),
            location_id: Set(location_id),
            item_name: Set(item_name),
            unit: Set(unit),
            quantity_on_hand: Set(Decimal::ZERO),
            reserved_quantity: Set(Decimal::ZERO),
            damaged_quantity: Set(Decimal::ZERO),
            min_threshold: Set(min_threshold),
            max_threshold: Set(max_threshold),
            unit_cost: Set(unit_cost),
            expiry_date: Set(expiry_date),
            last_movement_at: Set(None),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(ServiceError::DatabaseError)
    }

    /// Unit cost used for valuing deltas: the record's own cost when one
    /// exists, the catalog's otherwise.
    pub async fn unit_cost(&self, item_id: Uuid, location_id: Uuid) -> Result<Option<Decimal>, ServiceError> {
        if let Some(record) = self.get(item_id, location_id).await? {
            return Ok(Some(record.unit_cost));
        }
        let item = item_master::Entity::find_by_id(item_id).one(&*self.db).await?;
        Ok(item.map(|i| i.unit_cost))
    }
}
