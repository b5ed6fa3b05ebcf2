#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use tempfile::TempDir;
use tokio::sync::mpsc;
use uuid::Uuid;

use stockflow_api::config::AppConfig;
use stockflow_api::db::{self, DbConfig};
use stockflow_api::entities::cash_sale::{self, PaymentMethod};
use stockflow_api::entities::item_master;
use stockflow_api::entities::operator::{self, OperatorRole};
use stockflow_api::entities::stock_record;
use stockflow_api::events::{Event, EventSender};
use stockflow_api::handlers::AppServices;

/// One isolated application instance backed by a throwaway sqlite file.
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub config: AppConfig,
    // Keeps the event channel open for the lifetime of the test.
    pub events: mpsc::Receiver<Event>,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawns an app with the default test configuration after applying the
/// given tweak (thresholds, stock check policy, ...).
pub async fn spawn_app_with<F: FnOnce(&mut AppConfig)>(tweak: F) -> TestApp {
    let dir = TempDir::new().expect("create temp dir");
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = db::establish_connection_with_config(&DbConfig {
        url: url.clone(),
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("connect to test database");
    db::run_migrations(&pool).await.expect("run migrations");
    let db = Arc::new(pool);

    let mut config = AppConfig::new(url, "127.0.0.1".into(), 0, "test".into());
    tweak(&mut config);

    let (tx, rx) = mpsc::channel(256);
    let sender = EventSender::new(tx);
    let services = AppServices::build(db.clone(), &config, sender);

    TestApp {
        db,
        services,
        config,
        events: rx,
        _dir: dir,
    }
}

pub async fn seed_operator(db: &DatabaseConnection, name: &str, role: OperatorRole) -> Uuid {
    let operator_id = Uuid::new_v4();
    operator::ActiveModel {
        operator_id: Set(operator_id),
        name: Set(name.to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed operator");
    operator_id
}

pub async fn seed_item(db: &DatabaseConnection, name: &str, unit_cost: Decimal) -> Uuid {
    let item_id = Uuid::new_v4();
    item_master::ActiveModel {
        item_id: Set(item_id),
        name: Set(name.to_string()),
        unit: Set("unit".to_string()),
        unit_cost: Set(unit_cost),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed item");
    item_id
}

pub async fn seed_stock(
    db: &DatabaseConnection,
    item_id: Uuid,
    location_id: Uuid,
    name: &str,
    quantity: Decimal,
    unit_cost: Decimal,
) -> Uuid {
    let record_id = Uuid::new_v4();
    let now = Utc::now();
    stock_record::ActiveModel {
        record_id: Set(record_id),
        item_id: Set(item_id),
        location_id: Set(location_id),
        item_name: Set(name.to_string()),
        unit: Set("unit".to_string()),
        quantity_on_hand: Set(quantity),
        reserved_quantity: Set(Decimal::ZERO),
        damaged_quantity: Set(Decimal::ZERO),
        min_threshold: Set(None),
        max_threshold: Set(None),
        unit_cost: Set(unit_cost),
        expiry_date: Set(None),
        last_movement_at: Set(None),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed stock record");
    record_id
}

pub async fn seed_cash_sale(
    db: &DatabaseConnection,
    cashier_id: Option<Uuid>,
    cashier_name: &str,
    amount: Decimal,
    payment_method: PaymentMethod,
    sold_at: DateTime<Utc>,
) -> Uuid {
    let sale_id = Uuid::new_v4();
    cash_sale::ActiveModel {
        sale_id: Set(sale_id),
        cashier_id: Set(cashier_id),
        cashier_name: Set(cashier_name.to_string()),
        amount: Set(amount),
        payment_method: Set(payment_method),
        sold_at: Set(sold_at),
    }
    .insert(db)
    .await
    .expect("seed cash sale");
    sale_id
}
