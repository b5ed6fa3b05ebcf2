use rust_decimal::Decimal;

use crate::config::{AppConfig, StockCheckPolicy};
use crate::entities::operator::OperatorRole;

/// Thresholds and policies governing ledger mutations.
///
/// The adjustment and transfer thresholds are deliberately distinct named
/// values; the source system never unified them.
#[derive(Clone, Copy, Debug)]
pub struct MovementPolicy {
    pub adjustment_approval_threshold: Decimal,
    pub transfer_approval_threshold: Decimal,
    pub stock_check: StockCheckPolicy,
}

impl MovementPolicy {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            adjustment_approval_threshold: cfg.adjustment_approval_threshold,
            transfer_approval_threshold: cfg.transfer_approval_threshold,
            stock_check: cfg.stock_check_policy,
        }
    }
}

/// Whether a proposed mutation of the given valued amount needs a
/// second-person approval. Amounts at the threshold do not.
pub fn requires_approval(valued_amount: Decimal, threshold: Decimal) -> bool {
    valued_amount.abs() > threshold
}

/// Only managers and admins may approve or reject pending records.
pub fn can_approve(role: OperatorRole) -> bool {
    matches!(role, OperatorRole::Manager | OperatorRole::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_at_threshold_do_not_require_approval() {
        assert!(!requires_approval(dec!(1000), dec!(1000)));
        assert!(requires_approval(dec!(1000.01), dec!(1000)));
        assert!(!requires_approval(dec!(0), dec!(1000)));
    }

    #[test]
    fn negative_valued_amounts_compare_by_magnitude() {
        assert!(requires_approval(dec!(-1200), dec!(1000)));
    }

    #[test]
    fn only_supervisors_can_approve() {
        assert!(!can_approve(OperatorRole::Staff));
        assert!(can_approve(OperatorRole::Manager));
        assert!(can_approve(OperatorRole::Admin));
    }
}
