//! Slow stochastic oscillator with an extra %K smoothing stage.
//!
//! Per bar t:
//! 1. rawK = 100 * (close - LL) / (HH - LL) over the `length_k` window ending at t
//! 2. fast %K = SMA(rawK, smooth_k)
//! 3. smoothed %K = SMA(fast %K, smooth_k)
//! 4. smoothed %D = SMA(smoothed %K, smooth_d)
//!
//! Lookback: length_k + 2 * smooth_k + smooth_d - 4 (first bar where %D is valid).
//!
//! A window with zero range (HH == LL) yields rawK = 50.0, the neutral midpoint.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::sma::Sma;
use super::Indicator;
use crate::domain::Bar;

/// rawK emitted when the high/low range of the window is zero.
pub const ZERO_RANGE_RAW_K: f64 = 50.0;

/// Window lengths for the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticConfig {
    pub length_k: usize,
    pub smooth_k: usize,
    pub smooth_d: usize,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        Self {
            length_k: 92,
            smooth_k: 18,
            smooth_d: 18,
        }
    }
}

impl StochasticConfig {
    pub fn new(length_k: usize, smooth_k: usize, smooth_d: usize) -> Self {
        Self {
            length_k,
            smooth_k,
            smooth_d,
        }
    }

    /// Index of the first bar with a valid %D.
    pub fn lookback(&self) -> usize {
        (self.length_k + 2 * self.smooth_k + self.smooth_d).saturating_sub(4)
    }

    /// Number of bars needed before the first valid reading.
    pub fn min_bars(&self) -> usize {
        self.lookback() + 1
    }

    pub fn is_valid(&self) -> bool {
        self.length_k >= 1 && self.smooth_k >= 1 && self.smooth_d >= 1
    }
}

/// Both lines valid on the same bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
}

/// Per-bar output where each line becomes valid on its own schedule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StochasticLines {
    pub k: Option<f64>,
    pub d: Option<f64>,
}

impl StochasticLines {
    pub fn reading(&self) -> Option<StochasticReading> {
        match (self.k, self.d) {
            (Some(k), Some(d)) => Some(StochasticReading { k, d }),
            _ => None,
        }
    }
}

/// Highest high / lowest low over the last `period` bars.
#[derive(Debug, Clone)]
struct RollingRange {
    period: usize,
    window: VecDeque<(f64, f64)>,
}

impl RollingRange {
    fn new(period: usize) -> Self {
        assert!(period >= 1, "stochastic length_k must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
        }
    }

    /// Returns `(lowest_low, highest_high)` once the window is full.
    fn push(&mut self, high: f64, low: f64) -> Option<(f64, f64)> {
        self.window.push_back((high, low));
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }
        let (mut highest, mut lowest) = (f64::NEG_INFINITY, f64::INFINITY);
        for &(h, l) in &self.window {
            highest = highest.max(h);
            lowest = lowest.min(l);
        }
        Some((lowest, highest))
    }
}

fn raw_k(close: f64, lowest: f64, highest: f64) -> f64 {
    let range = highest - lowest;
    if range == 0.0 {
        return ZERO_RANGE_RAW_K;
    }
    100.0 * (close - lowest) / range
}

/// Rolling buffers for one symbol's oscillator, fed one bar at a time.
#[derive(Debug, Clone)]
pub struct StochasticState {
    range: RollingRange,
    fast_k: Sma,
    smooth_k: Sma,
    smooth_d: Sma,
}

impl StochasticState {
    pub fn new(config: StochasticConfig) -> Self {
        Self {
            range: RollingRange::new(config.length_k),
            fast_k: Sma::new(config.smooth_k),
            smooth_k: Sma::new(config.smooth_k),
            smooth_d: Sma::new(config.smooth_d),
        }
    }

    /// Feed the next bar. Each stage only receives values once the stage
    /// before it is valid.
    pub fn update(&mut self, bar: &Bar) -> StochasticLines {
        let raw = self
            .range
            .push(bar.high, bar.low)
            .map(|(lowest, highest)| raw_k(bar.close, lowest, highest));
        let fast = raw.and_then(|r| self.fast_k.push(r));
        let k = fast.and_then(|f| self.smooth_k.push(f));
        let d = k.and_then(|k| self.smooth_d.push(k));
        StochasticLines { k, d }
    }
}

/// Stochastic indicator over a full series.
#[derive(Debug, Clone)]
pub struct Stochastic {
    config: StochasticConfig,
    name: String,
}

impl Stochastic {
    pub fn new(config: StochasticConfig) -> Self {
        Self {
            config,
            name: format!(
                "stoch_{}_{}_{}",
                config.length_k, config.smooth_k, config.smooth_d
            ),
        }
    }

    pub fn config(&self) -> StochasticConfig {
        self.config
    }

    /// Per-bar %K and %D, each `None` until its own window is full.
    pub fn lines(&self, bars: &[Bar]) -> Vec<StochasticLines> {
        let mut state = StochasticState::new(self.config);
        bars.iter().map(|bar| state.update(bar)).collect()
    }
}

impl Indicator for Stochastic {
    type Output = StochasticReading;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.config.lookback()
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<StochasticReading>> {
        self.lines(bars).iter().map(StochasticLines::reading).collect()
    }
}
