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

use crate::entities::cash_movement::{self, CashMovementType};
use crate::entities::shift::{self, ShiftStatus};
use crate::errors::ServiceError;
use crate::services::shifts::{RecordCashMovement, ShiftTotals};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shifts).post(open_shift))
        .route("/:id", get(get_shift))
        .route("/:id/close", post(close_shift))
        .route("/:id/cash-movements", get(list_cash_movements).post(record_cash_movement))
        .route("/:id/totals", get(get_totals))
}

#[derive(Debug, Deserialize)]
pub struct OpenShiftRequest {
    pub cashier_id: Uuid,
    pub initial_cash: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloseShiftRequest {
    pub actual_cash: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CashMovementRequest {
    pub movement_type: CashMovementType,
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Reason cannot be empty"))]
    pub reason: String,
    pub created_by: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShiftListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<ShiftStatus>,
    pub cashier_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ShiftView {
    pub shift_id: Uuid,
    pub cashier_id: Uuid,
    pub cashier_name: String,
    pub status: ShiftStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub initial_cash: Decimal,
    pub expected_cash_at_close: Option<Decimal>,
    pub actual_cash_at_close: Option<Decimal>,
    pub discrepancy: Option<Decimal>,
    pub notes: Option<String>,
}

impl From<shift::Model> for ShiftView {
    fn from(model: shift::Model) -> Self {
        Self {
            shift_id: model.shift_id,
            cashier_id: model.cashier_id,
            cashier_name: model.cashier_name,
            status: model.status,
            start_time: model.start_time,
            end_time: model.end_time,
            initial_cash: model.initial_cash,
            expected_cash_at_close: model.expected_cash_at_close,
            actual_cash_at_close: model.actual_cash_at_close,
            discrepancy: model.discrepancy,
            notes: model.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CashMovementView {
    pub movement_id: Uuid,
    pub shift_id: Uuid,
    pub movement_type: CashMovementType,
    pub amount: Decimal,
    pub reason: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<cash_movement::Model> for CashMovementView {
    fn from(model: cash_movement::Model) -> Self {
        Self {
            movement_id: model.movement_id,
            shift_id: model.shift_id,
            movement_type: model.movement_type,
            amount: model.amount,
            reason: model.reason,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShiftTotalsView {
    pub initial_cash: Decimal,
    pub cash_sales: Decimal,
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub expected_cash: Decimal,
}

impl From<ShiftTotals> for ShiftTotalsView {
    fn from(totals: ShiftTotals) -> Self {
        Self {
            initial_cash: totals.initial_cash,
            cash_sales: totals.cash_sales,
            cash_in: totals.cash_in,
            cash_out: totals.cash_out,
            expected_cash: totals.expected_cash(),
        }
    }
}

async fn open_shift(
    State(state): State<AppState>,
    Json(payload): Json<OpenShiftRequest>,
) -> ApiResult<ShiftView> {
    let model = state
        .services
        .shifts
        .open(payload.cashier_id, payload.initial_cash, payload.notes)
        .await?;
    Ok(Json(ApiResponse::success(ShiftView::from(model))))
}

async fn get_shift(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<ShiftView> {
    let model = state.services.shifts.get(id).await?;
    Ok(Json(ApiResponse::success(ShiftView::from(model))))
}

async fn close_shift(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseShiftRequest>,
) -> ApiResult<ShiftView> {
    let model = state
        .services
        .shifts
        .close(id, payload.actual_cash, payload.notes)
        .await?;
    Ok(Json(ApiResponse::success(ShiftView::from(model))))
}

async fn record_cash_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CashMovementRequest>,
) -> ApiResult<CashMovementView> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let model = state
        .services
        .shifts
        .record_cash_movement(RecordCashMovement {
            shift_id: id,
            movement_type: payload.movement_type,
            amount: payload.amount,
            reason: payload.reason,
            created_by: payload.created_by,
        })
        .await?;
    Ok(Json(ApiResponse::success(CashMovementView::from(model))))
}

async fn list_cash_movements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<CashMovementView>> {
    let movements = state.services.shifts.movements(id).await?;
    let items = movements.into_iter().map(CashMovementView::from).collect();
    Ok(Json(ApiResponse::success(items)))
}

async fn get_totals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ShiftTotalsView> {
    let totals = state.services.shifts.totals_for(id).await?;
    Ok(Json(ApiResponse::success(ShiftTotalsView::from(totals))))
}

async fn list_shifts(
    State(state): State<AppState>,
    Query(query): Query<ShiftListQuery>,
) -> ApiResult<PaginatedResponse<ShiftView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .shifts
        .list(query.status, query.cashier_id, page, limit)
        .await?;
    let items = records.into_iter().map(ShiftView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}
