mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{seed_item, seed_operator, seed_stock, spawn_app, spawn_app_with};
use stockflow_api::config::StockCheckPolicy;
use stockflow_api::entities::operator::OperatorRole;
use stockflow_api::entities::transfer_order::TransferStatus;
use stockflow_api::errors::ServiceError;
use stockflow_api::services::transfers::CreateTransfer;

#[tokio::test]
async fn transfer_walks_the_full_lifecycle_and_moves_stock_on_completion() {
    let app = spawn_app().await;
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, source, "beans", dec!(40), dec!(12)).await;

    let transfer = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: source,
            destination_location_id: destination,
            lines: vec![(item, dec!(15))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Draft);

    // 15 x 12 = 180, below the 1000 threshold: submit approves directly.
    let transfer = app.services.transfers.submit(transfer.transfer_id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);

    let transfer = app.services.transfers.dispatch(transfer.transfer_id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::InTransit);

    // Stock is untouched until completion.
    let at_source = app.services.ledger.get(item, source).await.unwrap().unwrap();
    assert_eq!(at_source.quantity_on_hand, dec!(40));
    assert!(app.services.ledger.get(item, destination).await.unwrap().is_none());

    let transfer = app.services.transfers.receive(transfer.transfer_id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Received);

    let transfer = app.services.transfers.complete(transfer.transfer_id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Completed);

    let at_source = app.services.ledger.get(item, source).await.unwrap().unwrap();
    assert_eq!(at_source.quantity_on_hand, dec!(25));
    // Destination record was created on the fly with the source attributes.
    let at_destination = app.services.ledger.get(item, destination).await.unwrap().unwrap();
    assert_eq!(at_destination.quantity_on_hand, dec!(15));
    assert_eq!(at_destination.item_name, "beans");
    assert_eq!(at_destination.unit_cost, dec!(12));
}

#[tokio::test]
async fn high_value_transfer_needs_a_manager() {
    let app = spawn_app().await;
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let manager = seed_operator(&app.db, "morgan", OperatorRole::Manager).await;
    let item = seed_item(&app.db, "espresso machine", dec!(400)).await;
    seed_stock(&app.db, item, source, "espresso machine", dec!(10), dec!(400)).await;

    let transfer = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: source,
            destination_location_id: destination,
            lines: vec![(item, dec!(4))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap();

    // 4 x 400 = 1600 crosses the threshold.
    let transfer = app.services.transfers.submit(transfer.transfer_id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::PendingApproval);

    let err = app
        .services
        .transfers
        .approve(transfer.transfer_id, staff)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let transfer = app
        .services
        .transfers
        .approve(transfer.transfer_id, manager)
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);
    assert_eq!(transfer.approved_by, Some(manager));
}

#[tokio::test]
async fn transitions_are_forward_only() {
    let app = spawn_app().await;
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, source, "beans", dec!(40), dec!(12)).await;

    let transfer = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: source,
            destination_location_id: destination,
            lines: vec![(item, dec!(5))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap();

    // A draft cannot be dispatched, received or completed.
    for result in [
        app.services.transfers.dispatch(transfer.transfer_id).await,
        app.services.transfers.receive(transfer.transfer_id).await,
        app.services.transfers.complete(transfer.transfer_id).await,
    ] {
        assert!(matches!(result.unwrap_err(), ServiceError::InvalidStatus(_)));
    }

    // Cancellation is allowed anywhere before completion and is terminal.
    let transfer = app.services.transfers.cancel(transfer.transfer_id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Cancelled);

    let err = app.services.transfers.submit(transfer.transfer_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus(_)));

    let at_source = app.services.ledger.get(item, source).await.unwrap().unwrap();
    assert_eq!(at_source.quantity_on_hand, dec!(40));
}

#[tokio::test]
async fn creation_is_blocked_on_insufficient_stock_by_default() {
    let app = spawn_app().await;
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, source, "beans", dec!(3), dec!(12)).await;

    let err = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: source,
            destination_location_id: destination,
            lines: vec![(item, dec!(10))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));
}

#[tokio::test]
async fn deferred_policy_checks_availability_at_completion() {
    let app = spawn_app_with(|cfg| {
        cfg.stock_check_policy = StockCheckPolicy::DeferToCompletion;
    })
    .await;
    let source = Uuid::new_v4();
    let destination = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, source, "beans", dec!(3), dec!(12)).await;

    // Creation is allowed despite the shortfall.
    let transfer = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: source,
            destination_location_id: destination,
            lines: vec![(item, dec!(10))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap();

    let transfer = app.services.transfers.submit(transfer.transfer_id).await.unwrap();
    let transfer = app.services.transfers.dispatch(transfer.transfer_id).await.unwrap();
    let transfer = app.services.transfers.receive(transfer.transfer_id).await.unwrap();

    // The shortfall is enforced at the only ledger-mutating transition.
    let err = app.services.transfers.complete(transfer.transfer_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // Nothing moved and the transfer is still completable once restocked.
    let current = app.services.transfers.get(transfer.transfer_id).await.unwrap();
    assert_eq!(current.status, TransferStatus::Received);
    let at_source = app.services.ledger.get(item, source).await.unwrap().unwrap();
    assert_eq!(at_source.quantity_on_hand, dec!(3));
}

#[tokio::test]
async fn untracked_line_names_resolve_from_the_catalog() {
    let app = spawn_app_with(|cfg| {
        cfg.stock_check_policy = StockCheckPolicy::DeferToCompletion;
    })
    .await;
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    // Known to the catalog but with no stock record anywhere yet.
    let item = seed_item(&app.db, "oat milk", dec!(3)).await;

    let transfer = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: Uuid::new_v4(),
            destination_location_id: Uuid::new_v4(),
            lines: vec![(item, dec!(6))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(transfer.manifest.0[0].name, "oat milk");
}

#[tokio::test]
async fn manifest_validation_rejects_bad_requests() {
    let app = spawn_app().await;
    let location = Uuid::new_v4();
    let staff = seed_operator(&app.db, "dana", OperatorRole::Staff).await;
    let item = seed_item(&app.db, "beans", dec!(12)).await;
    seed_stock(&app.db, item, location, "beans", dec!(40), dec!(12)).await;

    // Empty manifest.
    let err = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: location,
            destination_location_id: Uuid::new_v4(),
            lines: vec![],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Identical source and destination.
    let err = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: location,
            destination_location_id: location,
            lines: vec![(item, dec!(1))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Non-positive quantity.
    let err = app
        .services
        .transfers
        .create(CreateTransfer {
            source_location_id: location,
            destination_location_id: Uuid::new_v4(),
            lines: vec![(item, dec!(0))],
            requested_by: staff,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}
