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

use crate::entities::purchase_order::{
    self, PurchaseLine, PurchaseStatus, QualityStatus, ReceivedLine,
};
use crate::errors::ServiceError;
use crate::services::purchasing::{CreatePurchaseOrder, ReceiptLine};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchase_orders).post(create_purchase_order))
        .route("/:id", get(get_purchase_order))
        .route("/:id/place", post(place_purchase_order))
        .route("/:id/receive", post(receive_purchase_order))
        .route("/:id/reject", post(reject_purchase_order))
        .route("/:id/cancel", post(cancel_purchase_order))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PurchaseLineRequest {
    pub item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseOrderRequest {
    #[validate(length(min = 1, message = "Supplier name cannot be empty"))]
    pub supplier_name: String,
    pub location_id: Uuid,
    #[validate(length(min = 1, message = "Order must have at least one line"))]
    pub lines: Vec<PurchaseLineRequest>,
    pub created_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptLineRequest {
    pub item_id: Uuid,
    pub received_quantity: Decimal,
    pub quality_status: QualityStatus,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ReceivePurchaseOrderRequest {
    pub lines: Vec<ReceiptLineRequest>,
    pub received_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RejectPurchaseOrderRequest {
    pub rejected_by: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct PurchaseListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<PurchaseStatus>,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseOrderView {
    pub purchase_id: Uuid,
    pub supplier_name: String,
    pub location_id: Uuid,
    pub status: PurchaseStatus,
    pub lines: Vec<PurchaseLine>,
    pub received_lines: Option<Vec<ReceivedLine>>,
    pub created_by: Uuid,
    pub received_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<purchase_order::Model> for PurchaseOrderView {
    fn from(model: purchase_order::Model) -> Self {
        Self {
            purchase_id: model.purchase_id,
            supplier_name: model.supplier_name,
            location_id: model.location_id,
            status: model.status,
            lines: model.manifest.0,
            received_lines: model.received_manifest.map(|m| m.0),
            created_by: model.created_by,
            received_by: model.received_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> ApiResult<PurchaseOrderView> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let model = state
        .services
        .purchasing
        .create(CreatePurchaseOrder {
            supplier_name: payload.supplier_name,
            location_id: payload.location_id,
            lines: payload
                .lines
                .into_iter()
                .map(|l| PurchaseLine {
                    item_id: l.item_id,
                    name: l.name,
                    quantity: l.quantity,
                    unit_cost: l.unit_cost,
                })
                .collect(),
            created_by: payload.created_by,
        })
        .await?;
    Ok(Json(ApiResponse::success(PurchaseOrderView::from(model))))
}

async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderView> {
    let model = state.services.purchasing.get(id).await?;
    Ok(Json(ApiResponse::success(PurchaseOrderView::from(model))))
}

async fn place_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderView> {
    let model = state.services.purchasing.place(id).await?;
    Ok(Json(ApiResponse::success(PurchaseOrderView::from(model))))
}

async fn receive_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceivePurchaseOrderRequest>,
) -> ApiResult<PurchaseOrderView> {
    let receipts = payload
        .lines
        .into_iter()
        .map(|l| ReceiptLine {
            item_id: l.item_id,
            received_quantity: l.received_quantity,
            quality_status: l.quality_status,
            expiry_date: l.expiry_date,
        })
        .collect();

    let model = state
        .services
        .purchasing
        .receive(id, receipts, payload.received_by)
        .await?;
    Ok(Json(ApiResponse::success(PurchaseOrderView::from(model))))
}

async fn reject_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPurchaseOrderRequest>,
) -> ApiResult<PurchaseOrderView> {
    let model = state
        .services
        .purchasing
        .reject(id, payload.rejected_by)
        .await?;
    Ok(Json(ApiResponse::success(PurchaseOrderView::from(model))))
}

async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderView> {
    let model = state.services.purchasing.cancel(id).await?;
    Ok(Json(ApiResponse::success(PurchaseOrderView::from(model))))
}

async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<PurchaseListQuery>,
) -> ApiResult<PaginatedResponse<PurchaseOrderView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .purchasing
        .list(query.status, query.location_id, page, limit)
        .await?;
    let items = records.into_iter().map(PurchaseOrderView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}
