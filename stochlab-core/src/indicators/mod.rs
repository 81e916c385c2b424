//! Indicator pipeline.
//!
//! Indicators are pure functions of bar history: the value at bar t only
//! depends on bars 0..=t. Warmup bars produce `None`, never a numeric
//! sentinel.

pub mod sma;
pub mod stochastic;

pub use sma::Sma;
pub use stochastic::{
    Stochastic, StochasticConfig, StochasticLines, StochasticReading, StochasticState,
    ZERO_RANGE_RAW_K,
};

use crate::domain::Bar;

/// Trait for indicators computed over a full bar series.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    type Output;

    /// Human-readable name (e.g., "stoch_92_18_18").
    fn name(&self) -> &str;

    /// Index of the first bar that can produce a valid value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns one entry per bar; the first `lookback()` entries are `None`.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<Self::Output>>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
