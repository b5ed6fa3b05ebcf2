use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::count_entry::{self, ApprovalStatus};
use crate::entities::count_task::{self, CountFrequency, CountTaskStatus};
use crate::errors::ServiceError;
use crate::services::counts::{CreateCountTask, RecordCount};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task))
        .route("/tasks/:id/pause", post(pause_task))
        .route("/tasks/:id/resume", post(resume_task))
        .route("/entries", get(list_entries).post(record_entry))
        .route("/entries/:id", get(get_entry))
        .route("/entries/:id/approve", post(approve_entry))
        .route("/entries/:id/reject", post(reject_entry))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCountTaskRequest {
    #[validate(length(min = 1, message = "Task name cannot be empty"))]
    pub name: String,
    pub location_id: Uuid,
    pub frequency: CountFrequency,
    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RecordCountRequest {
    pub count_task_id: Option<Uuid>,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub counted_quantity: Decimal,
    pub counted_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub operator_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountTaskListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountEntryListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<ApprovalStatus>,
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub significant_only: bool,
}

#[derive(Debug, Serialize)]
pub struct CountTaskView {
    pub task_id: Uuid,
    pub name: String,
    pub location_id: Uuid,
    pub frequency: CountFrequency,
    pub start_date: DateTime<Utc>,
    pub next_run_date: DateTime<Utc>,
    pub status: CountTaskStatus,
}

impl From<count_task::Model> for CountTaskView {
    fn from(model: count_task::Model) -> Self {
        Self {
            task_id: model.task_id,
            name: model.name,
            location_id: model.location_id,
            frequency: model.frequency,
            start_date: model.start_date,
            next_run_date: model.next_run_date,
            status: model.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountEntryView {
    pub entry_id: Uuid,
    pub count_task_id: Option<Uuid>,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub counted_quantity: Decimal,
    pub system_quantity: Decimal,
    pub variance: Decimal,
    pub variance_percent: Decimal,
    pub variance_value: Decimal,
    pub significant: bool,
    pub status: ApprovalStatus,
    pub counted_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<count_entry::Model> for CountEntryView {
    fn from(model: count_entry::Model) -> Self {
        Self {
            entry_id: model.entry_id,
            count_task_id: model.count_task_id,
            item_id: model.item_id,
            location_id: model.location_id,
            counted_quantity: model.counted_quantity,
            system_quantity: model.system_quantity,
            variance: model.variance,
            variance_percent: model.variance_percent,
            variance_value: model.variance_value,
            significant: model.significant,
            status: model.status,
            counted_by: model.counted_by,
            approved_by: model.approved_by,
            created_at: model.created_at,
        }
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateCountTaskRequest>,
) -> ApiResult<CountTaskView> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let model = state
        .services
        .counts
        .create_task(CreateCountTask {
            name: payload.name,
            location_id: payload.location_id,
            frequency: payload.frequency,
            start_date: payload.start_date,
        })
        .await?;
    Ok(Json(ApiResponse::success(CountTaskView::from(model))))
}

async fn get_task(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<CountTaskView> {
    let model = state.services.counts.get_task(id).await?;
    Ok(Json(ApiResponse::success(CountTaskView::from(model))))
}

async fn pause_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CountTaskView> {
    let model = state.services.counts.pause_task(id).await?;
    Ok(Json(ApiResponse::success(CountTaskView::from(model))))
}

async fn resume_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CountTaskView> {
    let model = state.services.counts.resume_task(id).await?;
    Ok(Json(ApiResponse::success(CountTaskView::from(model))))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<CountTaskListQuery>,
) -> ApiResult<PaginatedResponse<CountTaskView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .counts
        .list_tasks(query.location_id, page, limit)
        .await?;
    let items = records.into_iter().map(CountTaskView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

async fn record_entry(
    State(state): State<AppState>,
    Json(payload): Json<RecordCountRequest>,
) -> ApiResult<CountEntryView> {
    let model = state
        .services
        .counts
        .record_entry(RecordCount {
            count_task_id: payload.count_task_id,
            item_id: payload.item_id,
            location_id: payload.location_id,
            counted_quantity: payload.counted_quantity,
            counted_by: payload.counted_by,
        })
        .await?;
    Ok(Json(ApiResponse::success(CountEntryView::from(model))))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CountEntryView> {
    let model = state.services.counts.get_entry(id).await?;
    Ok(Json(ApiResponse::success(CountEntryView::from(model))))
}

async fn approve_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> ApiResult<CountEntryView> {
    let model = state
        .services
        .counts
        .approve_entry(id, payload.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(CountEntryView::from(model))))
}

async fn reject_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> ApiResult<CountEntryView> {
    let model = state
        .services
        .counts
        .reject_entry(id, payload.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(CountEntryView::from(model))))
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<CountEntryListQuery>,
) -> ApiResult<PaginatedResponse<CountEntryView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .counts
        .list_entries(
            query.status,
            query.location_id,
            query.significant_only,
            page,
            limit,
        )
        .await?;
    let items = records.into_iter().map(CountEntryView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}
