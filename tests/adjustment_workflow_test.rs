mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{seed_item, seed_operator, seed_stock, spawn_app, spawn_app_with};
use stockflow_api::entities::operator::OperatorRole;
use stockflow_api::entities::stock_adjustment::{AdjustmentReason, ApprovalStatus};
use stockflow_api::errors::ServiceError;
use stockflow_api::services::adjustments::SubmitAdjustment;

fn write_off(item_id: Uuid, location_id: Uuid, delta: rust_decimal::Decimal, by: Uuid) -> SubmitAdjustment {
    SubmitAdjustment {
        item_id,
        location_id,
        quantity_delta: delta,
        reason: AdjustmentReason::Damage,
        notes: "three units crushed during unloading".into(),
        requested_by: by,
    }
}

#[tokio::test]
async fn high_value_adjustment_parks_pending_without_ledger_effect() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "espresso machine", dec!(400)).await;
    seed_stock(&app.db, item, location, "espresso machine", dec!(10), dec!(400)).await;

    // 3 x 400 = 1200, above the 1000 threshold.
    let adjustment = app
        .services
        .adjustments
        .submit(write_off(item, location, dec!(-3), staff))
        .await
        .unwrap();

    assert_eq!(adjustment.status, ApprovalStatus::Pending);
    assert_eq!(adjustment.valued_amount, dec!(1200));
    assert!(!adjustment.reference_missing);

    let record = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert_eq!(record.quantity_on_hand, dec!(10));
}

#[tokio::test]
async fn pending_adjustment_applies_only_after_manager_approval() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let manager = seed_operator(&app.db, "morgan", OperatorRole::Manager).await;
    let item = seed_item(&app.db, "espresso machine", dec!(400)).await;
    seed_stock(&app.db, item, location, "espresso machine", dec!(10), dec!(400)).await;

    let adjustment = app
        .services
        .adjustments
        .submit(write_off(item, location, dec!(-3), staff))
        .await
        .unwrap();

    // Staff cannot approve, even their own submission.
    let err = app
        .services
        .adjustments
        .approve(adjustment.adjustment_id, staff)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let approved = app
        .services
        .adjustments
        .approve(adjustment.adjustment_id, manager)
        .await
        .unwrap();
    assert_eq!(approved.status, ApprovalStatus::Approved);
    assert_eq!(approved.approved_by, Some(manager));
    assert!(!approved.self_approved);

    let record = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert_eq!(record.quantity_on_hand, dec!(7));

    // A second approval of the same record is refused.
    let err = app
        .services
        .adjustments
        .approve(adjustment.adjustment_id, manager)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));
}

#[tokio::test]
async fn below_threshold_adjustment_is_applied_immediately() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "oat milk", dec!(4)).await;
    seed_stock(&app.db, item, location, "oat milk", dec!(50), dec!(4)).await;

    let adjustment = app
        .services
        .adjustments
        .submit(write_off(item, location, dec!(-2), staff))
        .await
        .unwrap();

    assert_eq!(adjustment.status, ApprovalStatus::Approved);
    assert_eq!(adjustment.valued_amount, dec!(8));

    let record = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert_eq!(record.quantity_on_hand, dec!(48));

    let (movements, total) = app
        .services
        .ledger
        .movements(item, location, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(movements[0].quantity_delta, dec!(-2));
    assert_eq!(movements[0].resulting_quantity, dec!(48));
}

#[tokio::test]
async fn adjustment_requires_a_meaningful_justification() {
    let app = spawn_app().await;
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;

    let mut request = write_off(Uuid::new_v4(), Uuid::new_v4(), dec!(-1), staff);
    request.notes = "broken".into();
    let err = app.services.adjustments.submit(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let mut request = write_off(Uuid::new_v4(), Uuid::new_v4(), dec!(0), staff);
    request.notes = "nothing actually happened here".into();
    let err = app.services.adjustments.submit(request).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_item_is_flagged_and_valued_at_zero() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let phantom = Uuid::new_v4();

    let adjustment = app
        .services
        .adjustments
        .submit(write_off(phantom, location, dec!(5), staff))
        .await
        .unwrap();

    assert!(adjustment.reference_missing);
    assert_eq!(adjustment.valued_amount, dec!(0));
    // Zero valued amount never crosses the threshold.
    assert_eq!(adjustment.status, ApprovalStatus::Approved);

    let record = app.services.ledger.get(phantom, location).await.unwrap().unwrap();
    assert_eq!(record.quantity_on_hand, dec!(5));
}

#[tokio::test]
async fn rejection_never_touches_the_ledger() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let manager = seed_operator(&app.db, "morgan", OperatorRole::Manager).await;
    let item = seed_item(&app.db, "espresso machine", dec!(400)).await;
    seed_stock(&app.db, item, location, "espresso machine", dec!(10), dec!(400)).await;

    let adjustment = app
        .services
        .adjustments
        .submit(write_off(item, location, dec!(-3), staff))
        .await
        .unwrap();

    let rejected = app
        .services
        .adjustments
        .reject(adjustment.adjustment_id, manager)
        .await
        .unwrap();
    assert_eq!(rejected.status, ApprovalStatus::Rejected);

    let record = app.services.ledger.get(item, location).await.unwrap().unwrap();
    assert_eq!(record.quantity_on_hand, dec!(10));
}

#[tokio::test]
async fn manager_self_approval_is_allowed_but_flagged() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let manager = seed_operator(&app.db, "morgan", OperatorRole::Manager).await;
    let item = seed_item(&app.db, "grinder", dec!(600)).await;
    seed_stock(&app.db, item, location, "grinder", dec!(4), dec!(600)).await;

    let adjustment = app
        .services
        .adjustments
        .submit(write_off(item, location, dec!(-2), manager))
        .await
        .unwrap();
    assert_eq!(adjustment.status, ApprovalStatus::Pending);

    let approved = app
        .services
        .adjustments
        .approve(adjustment.adjustment_id, manager)
        .await
        .unwrap();
    assert!(approved.self_approved);
    assert_eq!(approved.status, ApprovalStatus::Approved);
}

#[tokio::test]
async fn threshold_is_configurable() {
    let app = spawn_app_with(|cfg| {
        cfg.adjustment_approval_threshold = dec!(5);
    })
    .await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "oat milk", dec!(4)).await;
    seed_stock(&app.db, item, location, "oat milk", dec!(50), dec!(4)).await;

    // 2 x 4 = 8 is above the lowered threshold of 5.
    let adjustment = app
        .services
        .adjustments
        .submit(write_off(item, location, dec!(-2), staff))
        .await
        .unwrap();
    assert_eq!(adjustment.status, ApprovalStatus::Pending);
}
