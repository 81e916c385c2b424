//! Indicator precomputation.
//!
//! The oscillator is computed once per symbol before the bar loop and the
//! resulting series is shared, read-only, by both directions. Values come
//! from the streaming state, so entry t only reflects bars 0..=t.

use crate::domain::Bar;
use crate::indicators::{Indicator, Stochastic, StochasticConfig, StochasticReading};

/// Precompute the stochastic readings for one symbol's bars.
pub fn precompute_stochastic(
    bars: &[Bar],
    config: StochasticConfig,
) -> Vec<Option<StochasticReading>> {
    let indicator = Stochastic::new(config);
    let series = indicator.compute(bars);
    debug_assert_eq!(
        series.len(),
        bars.len(),
        "indicator '{}' produced {} values for {} bars",
        indicator.name(),
        series.len(),
        bars.len()
    );
    series
}

/// Warmup length: bars before the first valid reading.
pub fn compute_warmup(config: StochasticConfig) -> usize {
    config.lookback()
}
