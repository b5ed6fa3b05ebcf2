//! Business logic. Each workflow gets one service struct over the shared
//! connection pool; the stock ledger service is the only component that
//! writes quantity columns.

pub mod adjustments;
pub mod catalog;
pub mod counts;
pub mod identity;
pub mod ledger;
pub mod policy;
pub mod purchasing;
pub mod shifts;
pub mod transfers;

/// Attempts for operations that can lose an optimistic-concurrency race.
pub(crate) const MAX_CONFLICT_RETRIES: usize = 3;
