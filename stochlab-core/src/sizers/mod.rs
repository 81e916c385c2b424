//! Position Sizers: determine order quantity
//!
//! Sizers translate a capital budget into whole shares for entries and
//! report the share count to close for exits.

pub mod fixed;

pub use fixed::FixedStakeSizer;

use crate::domain::Position;

/// Position sizing logic
///
/// # Responsibilities
/// - Convert price → whole-share entry quantity
/// - Report the quantity that closes an open position
///
/// # Non-Responsibilities
/// - Sizers do NOT decide entry/exit (that's the strategy's job)
/// - Sizers do NOT move cash (that's the portfolio's job)
pub trait Sizer: Send + Sync {
    /// Shares to open at `price`. Returns 0 when the budget buys nothing.
    fn entry_size(&self, price: f64) -> u64;

    /// Shares to close `position`: its absolute size, or 0 when flat.
    fn exit_size(&self, position: &Position) -> u64 {
        position.size.unsigned_abs()
    }

    /// Sizer name for logging
    fn name(&self) -> &str;
}
