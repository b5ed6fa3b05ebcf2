use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after state transitions commit. Consumers are
/// strictly after-the-fact; no workflow correctness depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Ledger events
    StockUpdated {
        item_id: Uuid,
        location_id: Uuid,
        quantity_delta: Decimal,
        new_quantity: Decimal,
    },
    StockClampedAtZero {
        item_id: Uuid,
        location_id: Uuid,
        requested_delta: Decimal,
        absorbed_shortfall: Decimal,
    },

    // Adjustment workflow
    AdjustmentSubmitted {
        adjustment_id: Uuid,
        auto_approved: bool,
        valued_amount: Decimal,
    },
    AdjustmentApproved {
        adjustment_id: Uuid,
        approved_by: Uuid,
    },
    AdjustmentRejected {
        adjustment_id: Uuid,
        rejected_by: Uuid,
    },

    // Transfer workflow
    TransferStatusChanged {
        transfer_id: Uuid,
        old_status: String,
        new_status: String,
    },
    TransferCompleted {
        transfer_id: Uuid,
        line_count: usize,
    },

    // Purchase workflow
    PurchaseOrderPlaced {
        purchase_id: Uuid,
    },
    PurchaseOrderReceived {
        purchase_id: Uuid,
        final_status: String,
        accepted_lines: usize,
    },

    // Count workflow
    CountEntryRecorded {
        entry_id: Uuid,
        variance: Decimal,
        significant: bool,
    },
    CountEntryResolved {
        entry_id: Uuid,
        approved: bool,
    },

    // Shift reconciliation
    ShiftOpened {
        shift_id: Uuid,
        cashier_id: Uuid,
    },
    CashMovementRecorded {
        shift_id: Uuid,
        movement_id: Uuid,
        amount: Decimal,
    },
    ShiftClosed {
        shift_id: Uuid,
        discrepancy: Decimal,
        closed_at: DateTime<Utc>,
    },
}

/// Handle for emitting events into the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget send; a dropped event is logged, never fatal.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Consumes events off the channel and logs them. Runs until every sender
/// is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::StockClampedAtZero {
                item_id,
                location_id,
                absorbed_shortfall,
                ..
            } => {
                warn!(
                    %item_id,
                    %location_id,
                    %absorbed_shortfall,
                    "ledger clamped a negative quantity at zero"
                );
            }
            other => info!(event = ?other, "domain event"),
        }
    }
    info!("Event channel closed; processor shutting down");
}
