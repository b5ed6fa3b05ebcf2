use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::cash_movement::{self, CashMovementType, Entity as CashMovement};
use crate::entities::cash_sale::{self, Entity as CashSale, PaymentMethod};
use crate::entities::shift::{self, Entity as Shift, ShiftStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::identity::IdentityService;

#[derive(Clone, Debug)]
pub struct RecordCashMovement {
    pub shift_id: Uuid,
    pub movement_type: CashMovementType,
    pub amount: Decimal,
    pub reason: String,
    pub created_by: Uuid,
}

/// Everything that feeds the expected-cash figure for one shift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShiftTotals {
    pub initial_cash: Decimal,
    pub cash_sales: Decimal,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
}

impl ShiftTotals {
    pub fn expected_cash(&self) -> Decimal {
        self.initial_cash + self.cash_sales + self.cash_in - self.cash_out
    }
}

/// Cash-drawer sessions: open, record manual movements, close with a
/// reconciliation of counted cash against the expected figure.
#[derive(Clone)]
pub struct ShiftService {
    db: Arc<DatabaseConnection>,
    identity: IdentityService,
    events: EventSender,
}

impl ShiftService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        identity: IdentityService,
        events: EventSender,
    ) -> Self {
        Self {
            db,
            identity,
            events,
        }
    }

    /// Opens a drawer session. A cashier can hold at most one OPEN shift.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        cashier_id: Uuid,
        initial_cash: Decimal,
        notes: Option<String>,
    ) -> Result<shift::Model, ServiceError> {
        if initial_cash < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Initial cash must not be negative".into(),
            ));
        }
        let cashier = self.identity.resolve(cashier_id).await?;

        let already_open = Shift::find()
            .filter(shift::Column::CashierId.eq(cashier_id))
            .filter(shift::Column::Status.eq(ShiftStatus::Open))
            .one(&*self.db)
            .await?;
        if let Some(existing) = already_open {
            return Err(ServiceError::InvalidOperation(format!(
                "Cashier {} already has open shift {}",
                cashier_id, existing.shift_id
            )));
        }

        let now = Utc::now();
        let model = shift::ActiveModel {
            shift_id: Set(Uuid::new_v4()),
            cashier_id: Set(cashier_id),
            cashier_name: Set(cashier.name),
            start_time: Set(now),
            end_time: Set(None),
            initial_cash: Set(initial_cash),
            status: Set(ShiftStatus::Open),
            expected_cash_at_close: Set(None),
            actual_cash_at_close: Set(None),
            discrepancy: Set(None),
            notes: Set(notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        self.events
            .send_or_log(Event::ShiftOpened {
                shift_id: model.shift_id,
                cashier_id,
            })
            .await;

        info!(shift_id = %model.shift_id, %cashier_id, "shift opened");
        Ok(model)
    }

    /// Appends a manual drawer movement. The status check is a guarded write
    /// on the shift row, so it serializes against a concurrent close: either
    /// this movement lands before the close flips the row (and is included
    /// in the close's totals), or the close wins and the movement is refused.
    #[instrument(skip(self, request), fields(shift_id = %request.shift_id))]
    pub async fn record_cash_movement(
        &self,
        request: RecordCashMovement,
    ) -> Result<cash_movement::Model, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Cash movement amount must be positive".into(),
            ));
        }
        if request.reason.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Cash movement reason must not be empty".into(),
            ));
        }
        self.identity.resolve(request.created_by).await?;

        let txn = self.db.begin().await?;

        let guard = Shift::update_many()
            .col_expr(shift::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(shift::Column::ShiftId.eq(request.shift_id))
            .filter(shift::Column::Status.eq(ShiftStatus::Open))
            .exec(&txn)
            .await?;
        if guard.rows_affected == 0 {
            return Err(match Shift::find_by_id(request.shift_id).one(&txn).await? {
                None => ServiceError::NotFound(format!("Shift {} not found", request.shift_id)),
                Some(_) => ServiceError::InvalidStatus(format!(
                    "Shift {} is closed; no further cash movements accepted",
                    request.shift_id
                )),
            });
        }

        let model = cash_movement::ActiveModel {
            movement_id: Set(Uuid::new_v4()),
            shift_id: Set(request.shift_id),
            movement_type: Set(request.movement_type),
            amount: Set(request.amount),
            reason: Set(request.reason),
            created_by: Set(request.created_by),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.events
            .send_or_log(Event::CashMovementRecorded {
                shift_id: request.shift_id,
                movement_id: model.movement_id,
                amount: model.amount,
            })
            .await;

        Ok(model)
    }

    /// Closes an open shift, computing the expected drawer figure and the
    /// discrepancy against the counted amount. The status flip and the
    /// totals read happen in one transaction, flip first, so the persisted
    /// figures cover every movement the shift will ever hold and a double
    /// close is impossible.
    #[instrument(skip(self))]
    pub async fn close(
        &self,
        shift_id: Uuid,
        actual_cash: Decimal,
        notes: Option<String>,
    ) -> Result<shift::Model, ServiceError> {
        if actual_cash < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Counted cash must not be negative".into(),
            ));
        }

        let txn = self.db.begin().await?;

        let current = Shift::find_by_id(shift_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shift {} not found", shift_id)))?;
        if current.status != ShiftStatus::Open {
            return Err(ServiceError::InvalidStatus(format!(
                "Shift {} is already closed",
                shift_id
            )));
        }

        // Flip OPEN -> CLOSED before reading totals. The flip write-locks the
        // shift row, so any movement whose guarded insert has not yet
        // committed either lands before this point (and is counted below) or
        // is refused once the close commits.
        let end_time = Utc::now();
        let result = Shift::update_many()
            .col_expr(shift::Column::Status, Expr::value(ShiftStatus::Closed))
            .col_expr(shift::Column::EndTime, Expr::value(end_time))
            .col_expr(shift::Column::UpdatedAt, Expr::value(end_time))
            .filter(shift::Column::ShiftId.eq(shift_id))
            .filter(shift::Column::Status.eq(ShiftStatus::Open))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidStatus(format!(
                "Shift {} was closed concurrently",
                shift_id
            )));
        }

        let totals = self.totals_in(&txn, &current, end_time).await?;
        let expected = totals.expected_cash();
        let discrepancy = actual_cash - expected;

        let mut update = Shift::update_many()
            .col_expr(shift::Column::ExpectedCashAtClose, Expr::value(expected))
            .col_expr(shift::Column::ActualCashAtClose, Expr::value(actual_cash))
            .col_expr(shift::Column::Discrepancy, Expr::value(discrepancy));
        if let Some(ref notes) = notes {
            update = update.col_expr(shift::Column::Notes, Expr::value(notes.clone()));
        }
        update
            .filter(shift::Column::ShiftId.eq(shift_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        if discrepancy != Decimal::ZERO {
            warn!(%shift_id, %expected, %actual_cash, %discrepancy, "cash discrepancy at shift close");
        }

        self.events
            .send_or_log(Event::ShiftClosed {
                shift_id,
                discrepancy,
                closed_at: end_time,
            })
            .await;

        info!(%shift_id, %expected, %actual_cash, %discrepancy, "shift closed");

        Ok(shift::Model {
            status: ShiftStatus::Closed,
            end_time: Some(end_time),
            expected_cash_at_close: Some(expected),
            actual_cash_at_close: Some(actual_cash),
            discrepancy: Some(discrepancy),
            notes: notes.or(current.notes),
            updated_at: end_time,
            ..current
        })
    }

    pub async fn get(&self, shift_id: Uuid) -> Result<shift::Model, ServiceError> {
        Shift::find_by_id(shift_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shift {} not found", shift_id)))
    }

    pub async fn list(
        &self,
        status: Option<ShiftStatus>,
        cashier_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<shift::Model>, u64), ServiceError> {
        let mut query = Shift::find().order_by_desc(shift::Column::StartTime);
        if let Some(status) = status {
            query = query.filter(shift::Column::Status.eq(status));
        }
        if let Some(cashier) = cashier_id {
            query = query.filter(shift::Column::CashierId.eq(cashier));
        }
        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn movements(
        &self,
        shift_id: Uuid,
    ) -> Result<Vec<cash_movement::Model>, ServiceError> {
        self.get(shift_id).await?;
        Ok(CashMovement::find()
            .filter(cash_movement::Column::ShiftId.eq(shift_id))
            .order_by_asc(cash_movement::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// The live reconciliation picture for an open shift, or the final one
    /// for a closed shift.
    pub async fn totals_for(&self, shift_id: Uuid) -> Result<ShiftTotals, ServiceError> {
        let current = self.get(shift_id).await?;
        let window_end = current.end_time.unwrap_or_else(Utc::now);
        self.totals_in(&*self.db, &current, window_end).await
    }

    async fn totals_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        current: &shift::Model,
        window_end: DateTime<Utc>,
    ) -> Result<ShiftTotals, ServiceError> {
        // Sales rows are attributed by cashier id. Rows from the legacy feed
        // carry no id and fall back to an exact name match.
        let attribution = Condition::any()
            .add(cash_sale::Column::CashierId.eq(current.cashier_id))
            .add(
                Condition::all()
                    .add(cash_sale::Column::CashierId.is_null())
                    .add(cash_sale::Column::CashierName.eq(current.cashier_name.clone())),
            );

        let sales = CashSale::find()
            .filter(cash_sale::Column::PaymentMethod.eq(PaymentMethod::Cash))
            .filter(cash_sale::Column::SoldAt.gte(current.start_time))
            .filter(cash_sale::Column::SoldAt.lte(window_end))
            .filter(attribution)
            .all(conn)
            .await?;
        let cash_sales = sales.iter().map(|s| s.amount).sum();

        let movements = CashMovement::find()
            .filter(cash_movement::Column::ShiftId.eq(current.shift_id))
            .all(conn)
            .await?;
        let (cash_in, cash_out) = movements.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(cash_in, cash_out), m| match m.movement_type {
                CashMovementType::In => (cash_in + m.amount, cash_out),
                CashMovementType::Out => (cash_in, cash_out + m.amount),
            },
        );

        Ok(ShiftTotals {
            initial_cash: current.initial_cash,
            cash_sales,
            cash_in,
            cash_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn expected_cash_combines_all_sources() {
        let totals = ShiftTotals {
            initial_cash: dec!(500),
            cash_sales: dec!(120),
            cash_in: dec!(0),
            cash_out: dec!(50),
        };
        assert_eq!(totals.expected_cash(), dec!(570));
    }

    #[test]
    fn expected_cash_with_no_activity_is_the_float() {
        let totals = ShiftTotals {
            initial_cash: dec!(300),
            cash_sales: dec!(0),
            cash_in: dec!(0),
            cash_out: dec!(0),
        };
        assert_eq!(totals.expected_cash(), dec!(300));
    }
}
