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

use crate::entities::stock_adjustment::{self, AdjustmentReason, ApprovalStatus};
use crate::errors::ServiceError;
use crate::services::adjustments::SubmitAdjustment;
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_adjustments).post(submit_adjustment))
        .route("/:id", get(get_adjustment))
        .route("/:id/approve", post(approve_adjustment))
        .route("/:id/reject", post(reject_adjustment))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAdjustmentRequest {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub quantity_delta: Decimal,
    pub reason: AdjustmentReason,
    #[validate(length(min = 1, message = "Notes cannot be empty"))]
    pub notes: String,
    pub requested_by: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub operator_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjustmentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<ApprovalStatus>,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AdjustmentView {
    pub adjustment_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub quantity_delta: Decimal,
    pub reason: AdjustmentReason,
    pub notes: String,
    pub status: ApprovalStatus,
    pub valued_amount: Decimal,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub self_approved: bool,
    pub reference_missing: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<stock_adjustment::Model> for AdjustmentView {
    fn from(model: stock_adjustment::Model) -> Self {
        Self {
            adjustment_id: model.adjustment_id,
            item_id: model.item_id,
            location_id: model.location_id,
            quantity_delta: model.quantity_delta,
            reason: model.reason,
            notes: model.notes,
            status: model.status,
            valued_amount: model.valued_amount,
            requested_by: model.requested_by,
            approved_by: model.approved_by,
            self_approved: model.self_approved,
            reference_missing: model.reference_missing,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

async fn submit_adjustment(
    State(state): State<AppState>,
    Json(payload): Json<SubmitAdjustmentRequest>,
) -> ApiResult<AdjustmentView> {
    payload
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let model = state
        .services
        .adjustments
        .submit(SubmitAdjustment {
            item_id: payload.item_id,
            location_id: payload.location_id,
            quantity_delta: payload.quantity_delta,
            reason: payload.reason,
            notes: payload.notes,
            requested_by: payload.requested_by,
        })
        .await?;
    Ok(Json(ApiResponse::success(AdjustmentView::from(model))))
}

async fn get_adjustment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AdjustmentView> {
    let model = state.services.adjustments.get(id).await?;
    Ok(Json(ApiResponse::success(AdjustmentView::from(model))))
}

async fn approve_adjustment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> ApiResult<AdjustmentView> {
    let model = state
        .services
        .adjustments
        .approve(id, payload.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(AdjustmentView::from(model))))
}

async fn reject_adjustment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalRequest>,
) -> ApiResult<AdjustmentView> {
    let model = state
        .services
        .adjustments
        .reject(id, payload.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(AdjustmentView::from(model))))
}

async fn list_adjustments(
    State(state): State<AppState>,
    Query(query): Query<AdjustmentListQuery>,
) -> ApiResult<PaginatedResponse<AdjustmentView>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (records, total) = state
        .services
        .adjustments
        .list(query.status, query.location_id, page, limit)
        .await?;
    let items = records.into_iter().map(AdjustmentView::from).collect();

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, limit,
    ))))
}
