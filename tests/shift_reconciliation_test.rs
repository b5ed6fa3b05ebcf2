mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{seed_cash_sale, seed_operator, spawn_app};
use stockflow_api::entities::cash_movement::CashMovementType;
use stockflow_api::entities::cash_sale::PaymentMethod;
use stockflow_api::entities::operator::OperatorRole;
use stockflow_api::entities::shift::ShiftStatus;
use stockflow_api::errors::ServiceError;
use stockflow_api::services::shifts::RecordCashMovement;

#[tokio::test]
async fn close_reconciles_sales_and_movements_against_counted_cash() {
    let app = spawn_app().await;
    let cashier = seed_operator(&app.db, "alex", OperatorRole::Staff).await;

    let shift = app
        .services
        .shifts
        .open(cashier, dec!(500), None)
        .await
        .unwrap();
    assert_eq!(shift.status, ShiftStatus::Open);

    seed_cash_sale(
        &app.db,
        Some(cashier),
        "alex",
        dec!(120),
        PaymentMethod::Cash,
        Utc::now(),
    )
    .await;
    // Card sales never enter the drawer.
    seed_cash_sale(
        &app.db,
        Some(cashier),
        "alex",
        dec!(75),
        PaymentMethod::Card,
        Utc::now(),
    )
    .await;

    app.services
        .shifts
        .record_cash_movement(RecordCashMovement {
            shift_id: shift.shift_id,
            movement_type: CashMovementType::Out,
            amount: dec!(50),
            reason: "petty cash for cleaning supplies".into(),
            created_by: cashier,
        })
        .await
        .unwrap();

    // 500 + 120 - 50 = 570 expected; 565 counted.
    let closed = app
        .services
        .shifts
        .close(shift.shift_id, dec!(565), None)
        .await
        .unwrap();

    assert_eq!(closed.status, ShiftStatus::Closed);
    assert_eq!(closed.expected_cash_at_close, Some(dec!(570)));
    assert_eq!(closed.actual_cash_at_close, Some(dec!(565)));
    assert_eq!(closed.discrepancy, Some(dec!(-5)));
    assert!(closed.end_time.is_some());
}

#[tokio::test]
async fn a_cashier_holds_at_most_one_open_shift() {
    let app = spawn_app().await;
    let cashier = seed_operator(&app.db, "alex", OperatorRole::Staff).await;

    let first = app.services.shifts.open(cashier, dec!(300), None).await.unwrap();
    let err = app.services.shifts.open(cashier, dec!(300), None).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    // Closing the first frees the cashier for a new one.
    app.services.shifts.close(first.shift_id, dec!(300), None).await.unwrap();
    app.services.shifts.open(cashier, dec!(300), None).await.unwrap();
}

#[tokio::test]
async fn closed_shifts_are_immutable() {
    let app = spawn_app().await;
    let cashier = seed_operator(&app.db, "alex", OperatorRole::Staff).await;

    let shift = app.services.shifts.open(cashier, dec!(200), None).await.unwrap();
    app.services.shifts.close(shift.shift_id, dec!(200), None).await.unwrap();

    let err = app
        .services
        .shifts
        .close(shift.shift_id, dec!(200), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));

    let err = app
        .services
        .shifts
        .record_cash_movement(RecordCashMovement {
            shift_id: shift.shift_id,
            movement_type: CashMovementType::In,
            amount: dec!(10),
            reason: "late float top-up".into(),
            created_by: cashier,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));
}

#[tokio::test]
async fn persisted_close_figures_satisfy_the_discrepancy_law() {
    let app = spawn_app().await;
    let cashier = seed_operator(&app.db, "alex", OperatorRole::Staff).await;
    let shift = app.services.shifts.open(cashier, dec!(200), None).await.unwrap();

    seed_cash_sale(&app.db, Some(cashier), "alex", dec!(45), PaymentMethod::Cash, Utc::now()).await;
    for (movement_type, amount, reason) in [
        (CashMovementType::In, dec!(30), "change float from the safe"),
        (CashMovementType::Out, dec!(10), "courier tip"),
    ] {
        app.services
            .shifts
            .record_cash_movement(RecordCashMovement {
                shift_id: shift.shift_id,
                movement_type,
                amount,
                reason: reason.into(),
                created_by: cashier,
            })
            .await
            .unwrap();
    }

    let closed = app
        .services
        .shifts
        .close(shift.shift_id, dec!(270), None)
        .await
        .unwrap();

    // Recompute the expected figure from the stored rows: every movement
    // attached to the shift must be reflected in the persisted totals.
    let movements = app.services.shifts.movements(shift.shift_id).await.unwrap();
    let (cash_in, cash_out) = movements.iter().fold(
        (dec!(0), dec!(0)),
        |(cash_in, cash_out), m| match m.movement_type {
            CashMovementType::In => (cash_in + m.amount, cash_out),
            CashMovementType::Out => (cash_in, cash_out + m.amount),
        },
    );
    let expected = closed.initial_cash + dec!(45) + cash_in - cash_out;
    assert_eq!(expected, dec!(265));
    assert_eq!(closed.expected_cash_at_close, Some(expected));
    assert_eq!(closed.discrepancy, Some(dec!(270) - expected));

    // Once the figures are persisted, no further movement can join the shift
    // and skew them.
    let err = app
        .services
        .shifts
        .record_cash_movement(RecordCashMovement {
            shift_id: shift.shift_id,
            movement_type: CashMovementType::In,
            amount: dec!(5),
            reason: "found under the till".into(),
            created_by: cashier,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));
    let after = app.services.shifts.movements(shift.shift_id).await.unwrap();
    assert_eq!(after.len(), movements.len());
}

#[tokio::test]
async fn legacy_sales_rows_attribute_by_name_only_when_id_is_missing() {
    let app = spawn_app().await;
    let alex = seed_operator(&app.db, "alex", OperatorRole::Staff).await;
    let sam = seed_operator(&app.db, "sam", OperatorRole::Staff).await;

    let shift = app.services.shifts.open(alex, dec!(100), None).await.unwrap();

    // Legacy row: no id, matching name. Counted.
    seed_cash_sale(&app.db, None, "alex", dec!(30), PaymentMethod::Cash, Utc::now()).await;
    // Legacy row for someone else. Not counted.
    seed_cash_sale(&app.db, None, "sam", dec!(40), PaymentMethod::Cash, Utc::now()).await;
    // Row with a different id but a colliding name. Not counted: the id wins.
    seed_cash_sale(&app.db, Some(sam), "alex", dec!(25), PaymentMethod::Cash, Utc::now()).await;
    // Row with the right id under a stale name. Counted.
    seed_cash_sale(&app.db, Some(alex), "a. smith", dec!(15), PaymentMethod::Cash, Utc::now()).await;

    let totals = app.services.shifts.totals_for(shift.shift_id).await.unwrap();
    assert_eq!(totals.cash_sales, dec!(45));
    assert_eq!(totals.expected_cash(), dec!(145));
}

#[tokio::test]
async fn sales_outside_the_shift_window_are_excluded() {
    let app = spawn_app().await;
    let cashier = seed_operator(&app.db, "alex", OperatorRole::Staff).await;

    seed_cash_sale(
        &app.db,
        Some(cashier),
        "alex",
        dec!(80),
        PaymentMethod::Cash,
        Utc::now() - Duration::hours(2),
    )
    .await;

    let shift = app.services.shifts.open(cashier, dec!(100), None).await.unwrap();
    let closed = app.services.shifts.close(shift.shift_id, dec!(100), None).await.unwrap();

    assert_eq!(closed.expected_cash_at_close, Some(dec!(100)));
    assert_eq!(closed.discrepancy, Some(dec!(0)));
}

#[tokio::test]
async fn movement_validation_rejects_bad_input() {
    let app = spawn_app().await;
    let cashier = seed_operator(&app.db, "alex", OperatorRole::Staff).await;
    let shift = app.services.shifts.open(cashier, dec!(100), None).await.unwrap();

    let err = app
        .services
        .shifts
        .record_cash_movement(RecordCashMovement {
            shift_id: shift.shift_id,
            movement_type: CashMovementType::Out,
            amount: dec!(0),
            reason: "no-op".into(),
            created_by: cashier,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = app
        .services
        .shifts
        .record_cash_movement(RecordCashMovement {
            shift_id: shift.shift_id,
            movement_type: CashMovementType::Out,
            amount: dec!(10),
            reason: "   ".into(),
            created_by: cashier,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}
