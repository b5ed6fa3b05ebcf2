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

use crate::entities::transfer_order::{self, TransferLine, TransferStatus};
use crate::errors::ServiceError;
use crate::services::transfers::CreateTransfer;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route("/:id", get(get_transfer))
        .route("/:id/submit", post(submit_transfer))
        .route("/:id/approve", post(approve_transfer))
        .route("/:id/dispatch", post(dispatch_transfer))
        .route("/:id/receive", post(receive_transfer))
        .route("/:id/complete", post(complete_transfer))
        .route("/:id/cancel", post(cancel_transfer))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TransferLineRequest {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransferRequest {
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    #[validate(length(min = 1, message = "Manifest cannot be empty"))]
    pub lines: Vec<TransferLineRequest>,
    pub requested_by: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub operator_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransferListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<TransferStatus>,
}

#[derive(Debug, Serialize)]
pub struct TransferView {
    pub transfer_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub status: TransferStatus,
    pub lines: Vec<TransferLine>,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<transfer_order::Model> for TransferView {
    fn from(model: transfer_order::Model) -> Self {
        Self {
            transfer_id: model.transfer_id,
            source_location_id: model.source_location_id,
            destination_location_id: model.destination_location_id,
            status: model.status,
            lines: model.manifest.0,
            requested_by: model.requested_by,
            approved_by: model.approved_by,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

async fn create_transfer(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransferRequest>,
) -> ApiResult<TransferView> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let model = state
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: payload.source_location_id,
            destination_location_id: payload.destination_location_id,
            lines: payload
                .lines
                .into_iter()
                .map(|l| (l.item_id, l.quantity))
                .collect(),
            requested_by: payload.requested_by,
            notes: payload.notes,
        })
        .await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransferView> {
    let model = state.services.transfers.get(id).await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn submit_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransferView> {
    let model = state.services.transfers.submit(id).await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn approve_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> ApiResult<TransferView> {
    let model = state
        .services
        .transfers
        .approve(id, payload.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn dispatch_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransferView> {
    let model = state.services.transfers.dispatch(id).await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn receive_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransferView> {
    let model = state.services.transfers.receive(id).await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn complete_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransferView> {
    let model = state.services.transfers.complete(id).await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn cancel_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransferView> {
    let model = state.services.transfers.cancel(id).await?;
    Ok(Json(ApiResponse::success(TransferView::from(model))))
}

async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<TransferListQuery>,
) -> ApiResult<PaginatedResponse<TransferView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .transfers
        .list(query.status, page, limit)
        .await?;
    let items = records.into_iter().map(TransferView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}
