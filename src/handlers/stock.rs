use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{stock_movement, stock_record};
use crate::errors::ServiceError;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock))
        .route("/:item_id/:location_id", get(get_stock))
        .route("/:item_id/:location_id/availability", get(get_availability))
        .route("/:item_id/:location_id/movements", get(list_movements))
}

#[derive(Debug, Default, Deserialize)]
pub struct StockListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub item_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct StockRecordView {
    pub record_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub item_name: String,
    pub unit: String,
    pub quantity_on_hand: Decimal,
    pub reserved_quantity: Decimal,
    pub damaged_quantity: Decimal,
    pub available_quantity: Decimal,
    pub unit_cost: Decimal,
    pub expiry_date: Option<DateTime<Utc>>,
    pub last_movement_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<stock_record::Model> for StockRecordView {
    fn from(model: stock_record::Model) -> Self {
        let available_quantity = model.available_quantity();
        Self {
            record_id: model.record_id,
            item_id: model.item_id,
            location_id: model.location_id,
            item_name: model.item_name,
            unit: model.unit,
            quantity_on_hand: model.quantity_on_hand,
            reserved_quantity: model.reserved_quantity,
            damaged_quantity: model.damaged_quantity,
            available_quantity,
            unit_cost: model.unit_cost,
            expiry_date: model.expiry_date,
            last_movement_at: model.last_movement_at,
            updated_at: model.updated_at,
        }
    }
}

async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<StockListQuery>,
) -> ApiResult<PaginatedResponse<StockRecordView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .ledger
        .list(query.item_id, query.location_id, page, limit)
        .await?;
    let items = records.into_iter().map(StockRecordView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}

async fn get_stock(
    State(state): State<AppState>,
    Path((item_id, location_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StockRecordView> {
    match state.services.ledger.get(item_id, location_id).await? {
        Some(record) => Ok(Json(ApiResponse::success(StockRecordView::from(record)))),
        None => Err(ServiceError::NotFound(format!(
            "No stock record for item {} at location {}",
            item_id, location_id
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityView {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub available_quantity: Decimal,
}

async fn get_availability(
    State(state): State<AppState>,
    Path((item_id, location_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<AvailabilityView> {
    let available_quantity = state
        .services
        .ledger
        .available_quantity(item_id, location_id)
        .await?;
    Ok(Json(ApiResponse::success(AvailabilityView {
        item_id,
        location_id,
        available_quantity,
    })))
}

#[derive(Debug, Serialize)]
pub struct MovementView {
    pub movement_id: Uuid,
    pub movement_type: String,
    pub quantity_delta: Decimal,
    pub resulting_quantity: Decimal,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<stock_movement::Model> for MovementView {
    fn from(model: stock_movement::Model) -> Self {
        Self {
            movement_id: model.movement_id,
            movement_type: format!("{:?}", model.movement_type),
            quantity_delta: model.quantity_delta,
            resulting_quantity: model.resulting_quantity,
            reference_id: model.reference_id,
            reference_type: model.reference_type,
            created_at: model.created_at,
        }
    }
}

async fn list_movements(
    State(state): State<AppState>,
    Path((item_id, location_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<StockListQuery>,
) -> ApiResult<PaginatedResponse<MovementView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (movements, total) = state
        .services
        .ledger
        .movements(item_id, location_id, page, limit)
        .await?;
    let items = movements.into_iter().map(MovementView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}
