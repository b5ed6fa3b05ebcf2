mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use common::{seed_item, seed_stock, spawn_app};
use stockflow_api::entities::stock_movement::MovementType;
use stockflow_api::entities::stock_record::{self, Entity as StockRecord};
use stockflow_api::errors::ServiceError;
use stockflow_api::services::ledger::LedgerDelta;

fn delta(item: Uuid, location: Uuid, quantity: rust_decimal::Decimal) -> LedgerDelta {
    LedgerDelta {
        item_id: item,
        location_id: location,
        quantity_delta: quantity,
        movement_type: MovementType::Adjustment,
        reference_id: None,
        reference_type: None,
        expiry_date: None,
    }
}

#[tokio::test]
async fn negative_results_clamp_at_zero_and_keep_the_requested_delta_on_record() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, location, "beans", dec!(4), dec!(12)).await;

    let record = app
        .services
        .ledger
        .apply_delta(delta(item, location, dec!(-10)))
        .await
        .unwrap();
    assert_eq!(record.quantity_on_hand, dec!(0));

    // The audit row preserves what was asked for, not what was absorbed.
    let (movements, _) = app.services.ledger.movements(item, location, 1, 10).await.unwrap();
    assert_eq!(movements[0].quantity_delta, dec!(-10));
    assert_eq!(movements[0].resulting_quantity, dec!(0));

    // Applying more negative deltas to an empty record stays at zero.
    let record = app
        .services
        .ledger
        .apply_delta(delta(item, location, dec!(-1)))
        .await
        .unwrap();
    assert_eq!(record.quantity_on_hand, dec!(0));
}

#[tokio::test]
async fn every_mutation_bumps_the_version_and_stamps_movement_time() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, location, "beans", dec!(10), dec!(12)).await;

    let before = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert!(before.last_movement_at.is_none());

    app.services.ledger.apply_delta(delta(item, location, dec!(1))).await.unwrap();
    app.services.ledger.apply_delta(delta(item, location, dec!(2))).await.unwrap();

    let after = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert_eq!(after.quantity_on_hand, dec!(13));
    assert_eq!(after.version, before.version + 2);
    assert!(after.last_movement_at.is_some());
}

#[tokio::test]
async fn stale_version_updates_affect_no_rows() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, location, "beans", dec!(10), dec!(12)).await;

    let stale = app.services.ledger.get(item, location).await.unwrap().unwrap();

    // Someone else mutates the record first.
    app.services.ledger.apply_delta(delta(item, location, dec!(-1))).await.unwrap();

    // A guarded write against the stale version must be a no-op; this is
    // what turns concurrent writers into a retry instead of a lost update.
    let result = StockRecord::update_many()
        .col_expr(stock_record::Column::QuantityOnHand, Expr::value(dec!(999)))
        .filter(stock_record::Column::RecordId.eq(stale.record_id))
        .filter(stock_record::Column::Version.eq(stale.version))
        .exec(&*app.db)
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 0);

    let current = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert_eq!(current.quantity_on_hand, dec!(9));
}

#[tokio::test]
async fn batches_apply_all_lines_in_one_unit() {
    let app = spawn_app().await;
    let location_a = Uuid::new_v4();
    let location_b = Uuid::new_v4();
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, location_a, "beans", dec!(10), dec!(12)).await;

    let records = app
        .services
        .ledger
        .apply_deltas(vec![
            delta(item, location_a, dec!(-4)),
            delta(item, location_b, dec!(4)),
        ])
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let at_a = app.services.ledger.get(item, location_a).await.unwrap().unwrap();
    let at_b = app.services.ledger.get(item, location_b).await.unwrap().unwrap();
    assert_eq!(at_a.quantity_on_hand, dec!(6));
    assert_eq!(at_b.quantity_on_hand, dec!(4));
    // The new record inherits the sibling's display attributes.
    assert_eq!(at_b.item_name, "beans");
    assert_eq!(at_b.unit_cost, dec!(12));
}

#[tokio::test]
async fn a_failing_line_mid_batch_leaves_no_line_applied() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let item_a = seed_item(&app.db, "beans", dec!(12)).await;
    let item_b = seed_item(&app.db, "milk", dec!(2)).await;
    seed_stock(&app.db, item_a, location, "beans", dec!(10), dec!(12)).await;

    // The first line applies inside the transaction before the second line
    // is rejected; the rollback must take the first line with it.
    let err = app
        .services
        .ledger
        .apply_deltas(vec![
            delta(item_a, location, dec!(-4)),
            delta(item_b, location, dec!(0)),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let record = app.services.ledger.get(item_a, location).await.unwrap().unwrap();
    assert_eq!(record.quantity_on_hand, dec!(10));
    let (movements, total) = app
        .services
        .ledger
        .movements(item_a, location, 1, 10)
        .await
        .unwrap();
    assert!(movements.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn first_movement_for_an_untracked_item_creates_the_record_from_the_catalog() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let item = seed_item(&app.db, "syrup", dec!(6)).await;

    let expiry = Utc::now() + Duration::days(30);
    let mut receipt = delta(item, location, dec!(24));
    receipt.movement_type = MovementType::PurchaseReceipt;
    receipt.expiry_date = Some(expiry);

    let record = app.services.ledger.apply_delta(receipt).await.unwrap();
    assert_eq!(record.quantity_on_hand, dec!(24));
    assert_eq!(record.item_name, "syrup");
    assert_eq!(record.unit_cost, dec!(6));
    assert_eq!(record.expiry_date, Some(expiry));
}

#[tokio::test]
async fn available_quantity_subtracts_reserved_and_damaged() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    let record_id = seed_stock(&app.db, item, location, "beans", dec!(10), dec!(12)).await;

    StockRecord::update_many()
        .col_expr(stock_record::Column::ReservedQuantity, Expr::value(dec!(3)))
        .col_expr(stock_record::Column::DamagedQuantity, Expr::value(dec!(2)))
        .filter(stock_record::Column::RecordId.eq(record_id))
        .exec(&*app.db)
        .await
        .unwrap();

    let available = app
        .services
        .ledger
        .available_quantity(item, location)
        .await
        .unwrap();
    assert_eq!(available, dec!(5));

    // Unknown pairs read as zero instead of erroring.
    let none = app
        .services
        .ledger
        .available_quantity(Uuid::new_v4(), location)
        .await
        .unwrap();
    assert_eq!(none, dec!(0));
}
