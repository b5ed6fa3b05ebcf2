//! Database entities for the stock ledger, workflow records, and the
//! read-only collaborator boundary tables (catalog, identity, sales feed).

pub mod cash_movement;
pub mod cash_sale;
pub mod count_entry;
pub mod count_task;
pub mod item_master;
pub mod operator;
pub mod purchase_order;
pub mod shift;
pub mod stock_adjustment;
pub mod stock_movement;
pub mod stock_record;
pub mod transfer_order;
