use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::count_entry::{self, ApprovalStatus, Entity as CountEntry};
use crate::entities::count_task::{
    self, CountFrequency, CountTaskStatus, Entity as CountTask,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::identity::IdentityService;
use crate::services::ledger::StockLedgerService;

/// Variance above either bound flags the entry for operator attention.
const SIGNIFICANT_VARIANCE_PERCENT: Decimal = dec!(5);
const SIGNIFICANT_VARIANCE_VALUE: Decimal = dec!(500);

#[derive(Clone, Debug)]
pub struct CreateCountTask {
    pub name: String,
    pub location_id: Uuid,
    pub frequency: CountFrequency,
    pub start_date: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct RecordCount {
    /// None for an ad-hoc count outside any schedule.
    pub count_task_id: Option<Uuid>,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub counted_quantity: Decimal,
    pub counted_by: Uuid,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VarianceFigures {
    pub variance: Decimal,
    pub variance_percent: Decimal,
    pub variance_value: Decimal,
    pub significant: bool,
}

/// Physical count scheduling and variance recording. Counts observe the
/// ledger but never write to it; a confirmed discrepancy is fixed through
/// the adjustment workflow.
#[derive(Clone)]
pub struct CountService {
    db: Arc<DatabaseConnection>,
    ledger: StockLedgerService,
    identity: IdentityService,
    events: EventSender,
}

impl CountService {
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

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_task(
        &self,
        request: CreateCountTask,
    ) -> Result<count_task::Model, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Count task name must not be empty".into(),
            ));
        }

        let now = Utc::now();
        let model = count_task::ActiveModel {
            task_id: Set(Uuid::new_v4()),
            name: Set(request.name),
            location_id: Set(request.location_id),
            frequency: Set(request.frequency),
            start_date: Set(request.start_date),
            next_run_date: Set(request.start_date),
            status: Set(CountTaskStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(task_id = %model.task_id, "count task created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn pause_task(&self, task_id: Uuid) -> Result<count_task::Model, ServiceError> {
        self.set_task_status(task_id, CountTaskStatus::Paused).await
    }

    #[instrument(skip(self))]
    pub async fn resume_task(&self, task_id: Uuid) -> Result<count_task::Model, ServiceError> {
        self.set_task_status(task_id, CountTaskStatus::Active).await
    }

    pub async fn get_task(&self, task_id: Uuid) -> Result<count_task::Model, ServiceError> {
        CountTask::find_by_id(task_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Count task {} not found", task_id)))
    }

    pub async fn list_tasks(
        &self,
        location_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<count_task::Model>, u64), ServiceError> {
        let mut query = CountTask::find().order_by_asc(count_task::Column::NextRunDate);
        if let Some(location) = location_id {
            query = query.filter(count_task::Column::LocationId.eq(location));
        }
        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Records one counted figure against the current ledger snapshot and
    /// derives its variance. Recording against a scheduled task also rolls
    /// the task's next run date forward one period.
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn record_entry(
        &self,
        request: RecordCount,
    ) -> Result<count_entry::Model, ServiceError> {
        if request.counted_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Counted quantity must not be negative".into(),
            ));
        }
        self.identity.resolve(request.counted_by).await?;

        let task = match request.count_task_id {
            Some(task_id) => Some(self.get_task(task_id).await?),
            None => None,
        };

        let system_quantity = self
            .ledger
            .get(request.item_id, request.location_id)
            .await?
            .map(|r| r.quantity_on_hand)
            .unwrap_or(Decimal::ZERO);
        let unit_cost = self
            .ledger
            .unit_cost(request.item_id, request.location_id)
            .await?
            .unwrap_or(Decimal::ZERO);

        let figures = variance_figures(request.counted_quantity, system_quantity, unit_cost);
        if figures.significant {
            warn!(
                item_id = %request.item_id,
                variance = %figures.variance,
                variance_percent = %figures.variance_percent,
                "significant count variance"
            );
        }

        let now = Utc::now();
        let model = count_entry::ActiveModel {
            entry_id: Set(Uuid::new_v4()),
            count_task_id: Set(request.count_task_id),
            item_id: Set(request.item_id),
            location_id: Set(request.location_id),
            counted_quantity: Set(request.counted_quantity),
            system_quantity: Set(system_quantity),
            variance: Set(figures.variance),
            variance_percent: Set(figures.variance_percent),
            variance_value: Set(figures.variance_value),
            significant: Set(figures.significant),
            status: Set(ApprovalStatus::Pending),
            counted_by: Set(request.counted_by),
            approved_by: Set(None),
            self_approved: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        if let Some(task) = task {
            let next = advance_schedule(task.next_run_date, task.frequency);
            let mut active: count_task::ActiveModel = task.into();
            active.next_run_date = Set(next);
            active.updated_at = Set(now);
            active.update(&*self.db).await?;
        }

        self.events
            .send_or_log(Event::CountEntryRecorded {
                entry_id: model.entry_id,
                variance: figures.variance,
                significant: figures.significant,
            })
            .await;

        Ok(model)
    }

    /// Marks a variance as reviewed and accepted. Advisory only: the stock
    /// record is corrected via an adjustment, not here.
    #[instrument(skip(self))]
    pub async fn approve_entry(
        &self,
        entry_id: Uuid,
        approver_id: Uuid,
    ) -> Result<count_entry::Model, ServiceError> {
        self.resolve_entry(entry_id, approver_id, ApprovalStatus::Approved)
            .await
    }

    #[instrument(skip(self))]
    pub async fn reject_entry(
        &self,
        entry_id: Uuid,
        approver_id: Uuid,
    ) -> Result<count_entry::Model, ServiceError> {
        self.resolve_entry(entry_id, approver_id, ApprovalStatus::Rejected)
            .await
    }

    pub async fn get_entry(&self, entry_id: Uuid) -> Result<count_entry::Model, ServiceError> {
        CountEntry::find_by_id(entry_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Count entry {} not found", entry_id)))
    }

    pub async fn list_entries(
        &self,
        status: Option<ApprovalStatus>,
        location_id: Option<Uuid>,
        significant_only: bool,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<count_entry::Model>, u64), ServiceError> {
        let mut query = CountEntry::find().order_by_desc(count_entry::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(count_entry::Column::Status.eq(status));
        }
        if let Some(location) = location_id {
            query = query.filter(count_entry::Column::LocationId.eq(location));
        }
        if significant_only {
            query = query.filter(count_entry::Column::Significant.eq(true));
        }
        let paginator = query.paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    async fn resolve_entry(
        &self,
        entry_id: Uuid,
        approver_id: Uuid,
        target: ApprovalStatus,
    ) -> Result<count_entry::Model, ServiceError> {
        let approver = self.identity.require_approver(approver_id).await?;

        let entry = self.get_entry(entry_id).await?;
        if entry.status != ApprovalStatus::Pending {
            return Err(ServiceError::InvalidStatus(format!(
                "Count entry {} is {:?}; only pending entries can be resolved",
                entry_id, entry.status
            )));
        }

        let self_approved = entry.counted_by == approver.operator_id;
        if self_approved {
            warn!(%entry_id, operator = %approver_id, "self-approval of count entry");
        }

        let mut active: count_entry::ActiveModel = entry.into();
        active.status = Set(target);
        active.approved_by = Set(Some(approver.operator_id));
        active.self_approved = Set(self_approved);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.events
            .send_or_log(Event::CountEntryResolved {
                entry_id,
                approved: target == ApprovalStatus::Approved,
            })
            .await;

        Ok(updated)
    }

    async fn set_task_status(
        &self,
        task_id: Uuid,
        status: CountTaskStatus,
    ) -> Result<count_task::Model, ServiceError> {
        let task = self.get_task(task_id).await?;
        if task.status == status {
            return Ok(task);
        }
        let mut active: count_task::ActiveModel = task.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }
}

/// Variance math for one counted line. Variance and value keep their sign
/// (shrink is negative); only the significance test takes magnitudes.
///
/// A zero system quantity makes the percentage degenerate; any counted
/// surplus against zero is treated as a full 100% variance.
pub fn variance_figures(
    counted_quantity: Decimal,
    system_quantity: Decimal,
    unit_cost: Decimal,
) -> VarianceFigures {
    let variance = counted_quantity - system_quantity;
    let variance_percent = if system_quantity == Decimal::ZERO {
        if counted_quantity > Decimal::ZERO {
            dec!(100)
        } else {
            Decimal::ZERO
        }
    } else {
        variance / system_quantity * dec!(100)
    };
    let variance_value = variance * unit_cost;
    let significant = variance_percent.abs() > SIGNIFICANT_VARIANCE_PERCENT
        || variance_value.abs() > SIGNIFICANT_VARIANCE_VALUE;

    VarianceFigures {
        variance,
        variance_percent,
        variance_value,
        significant,
    }
}

/// Rolls a schedule forward one period from its current due date.
pub fn advance_schedule(from: DateTime<Utc>, frequency: CountFrequency) -> DateTime<Utc> {
    match frequency {
        CountFrequency::Daily => from + Duration::days(1),
        CountFrequency::Weekly => from + Duration::weeks(1),
        CountFrequency::Monthly => from + Months::new(1),
        CountFrequency::Annual => from + Months::new(12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn variance_figures_are_signed() {
        let figures = variance_figures(dec!(95), dec!(100), dec!(2));
        assert_eq!(figures.variance, dec!(-5));
        assert_eq!(figures.variance_percent, dec!(-5));
        assert_eq!(figures.variance_value, dec!(-10));
        assert!(!figures.significant);

        let surplus = variance_figures(dec!(104), dec!(100), dec!(2));
        assert_eq!(surplus.variance_value, dec!(8));
    }

    #[test]
    fn percent_above_bound_is_significant() {
        let figures = variance_figures(dec!(94), dec!(100), dec!(1));
        assert_eq!(figures.variance_percent, dec!(-6));
        assert!(figures.significant);
    }

    #[test]
    fn value_above_bound_is_significant_even_at_small_percent() {
        // 1% variance but 600 in value.
        let figures = variance_figures(dec!(9900), dec!(10000), dec!(6));
        assert_eq!(figures.variance_value, dec!(-600));
        assert!(figures.significant);
    }

    #[test]
    fn zero_system_quantity_degenerates_cleanly() {
        let surplus = variance_figures(dec!(3), dec!(0), dec!(1));
        assert_eq!(surplus.variance_percent, dec!(100));
        assert!(surplus.significant);

        let empty = variance_figures(dec!(0), dec!(0), dec!(1));
        assert_eq!(empty.variance, dec!(0));
        assert_eq!(empty.variance_percent, dec!(0));
        assert!(!empty.significant);
    }

    #[test]
    fn schedule_advances_by_frequency() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 6, 0, 0).unwrap();
        assert_eq!(
            advance_schedule(from, CountFrequency::Daily),
            Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap()
        );
        assert_eq!(
            advance_schedule(from, CountFrequency::Weekly),
            Utc.with_ymd_and_hms(2024, 2, 7, 6, 0, 0).unwrap()
        );
        // Month arithmetic clamps to the end of February.
        assert_eq!(
            advance_schedule(from, CountFrequency::Monthly),
            Utc.with_ymd_and_hms(2024, 2, 29, 6, 0, 0).unwrap()
        );
        assert_eq!(
            advance_schedule(from, CountFrequency::Annual),
            Utc.with_ymd_and_hms(2025, 1, 31, 6, 0, 0).unwrap()
        );
    }
}
