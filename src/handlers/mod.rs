pub mod adjustments;
pub mod counts;
pub mod purchase_orders;
pub mod shifts;
pub mod stock;
pub mod transfers;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::adjustments::AdjustmentService;
use crate::services::catalog::CatalogService;
use crate::services::counts::CountService;
use crate::services::identity::IdentityService;
use crate::services::ledger::StockLedgerService;
use crate::services::policy::MovementPolicy;
use crate::services::purchasing::PurchasingService;
use crate::services::shifts::ShiftService;
use crate::services::transfers::TransferService;
use crate::AppState;

/// All domain services, wired once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub identity: IdentityService,
    pub ledger: StockLedgerService,
    pub adjustments: AdjustmentService,
    pub transfers: TransferService,
    pub purchasing: PurchasingService,
    pub counts: CountService,
    pub shifts: ShiftService,
}

impl AppServices {
    pub fn build(db: Arc<DatabaseConnection>, config: &AppConfig, events: EventSender) -> Self {
        let policy = MovementPolicy::from_config(config);
        let catalog = CatalogService::new(db.clone());
        let identity = IdentityService::new(db.clone());
        let ledger = StockLedgerService::new(db.clone(), events.clone());
        let adjustments = AdjustmentService::new(
            db.clone(),
            ledger.clone(),
            identity.clone(),
            events.clone(),
            policy.clone(),
            config.min_adjustment_note_len,
        );
        let transfers = TransferService::new(
            db.clone(),
            ledger.clone(),
            catalog.clone(),
            identity.clone(),
            events.clone(),
            policy.clone(),
        );
        let purchasing = PurchasingService::new(
            db.clone(),
            ledger.clone(),
            identity.clone(),
            events.clone(),
        );
        let counts = CountService::new(
            db.clone(),
            ledger.clone(),
            identity.clone(),
            events.clone(),
        );
        let shifts = ShiftService::new(db, identity.clone(), events);

        Self {
            catalog,
            identity,
            ledger,
            adjustments,
            transfers,
            purchasing,
            counts,
            shifts,
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/stock", stock::routes())
        .nest("/adjustments", adjustments::routes())
        .nest("/transfers", transfers::routes())
        .nest("/purchase-orders", purchase_orders::routes())
        .nest("/counts", counts::routes())
        .nest("/shifts", shifts::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            "down"
        }
    };
    Json(json!({
        "status": if db_status == "up" { "ok" } else { "degraded" },
        "database": db_status,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
