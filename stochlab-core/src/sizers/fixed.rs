//! Fixed Stake Sizer
//!
//! Trade a fixed notional amount per entry, floored to whole shares.

use crate::sizers::Sizer;

/// Fixed notional sizer: `floor(stake / price)` shares per entry.
///
/// The stake never changes with realized P&L; every entry uses the same
/// budget regardless of the portfolio's remaining cash.
#[derive(Debug, Clone)]
pub struct FixedStakeSizer {
    stake: f64,
}

impl FixedStakeSizer {
    pub fn new(stake: f64) -> Self {
        assert!(stake > 0.0, "stake must be > 0");
        Self { stake }
    }

    pub fn stake(&self) -> f64 {
        self.stake
    }
}

impl Sizer for FixedStakeSizer {
    fn entry_size(&self, price: f64) -> u64 {
        if !price.is_finite() || price <= 0.0 {
            return 0;
        }
        (self.stake / price).floor() as u64
    }

    fn name(&self) -> &str {
        "FixedStake"
    }
}
