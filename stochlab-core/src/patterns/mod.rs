//! Candlestick pattern detection over a two-bar window.

pub mod engulfing;

pub use engulfing::{is_bearish_engulfing, is_bullish_engulfing, Engulfing};

use crate::domain::Bar;

/// A two-bar reversal pattern.
///
/// Detectors see only the previous and current bar, so they cannot look
/// ahead. With no previous bar a detector must return false.
pub trait PatternDetector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, prev: &Bar, cur: &Bar) -> bool;
}

/// The two most recent bars for one symbol.
#[derive(Debug, Clone, Default)]
pub struct PatternWindow {
    prev: Option<Bar>,
    cur: Option<Bar>,
}

impl PatternWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slide the window forward by one bar.
    pub fn push(&mut self, bar: &Bar) {
        self.prev = self.cur.take();
        self.cur = Some(bar.clone());
    }

    pub fn is_full(&self) -> bool {
        self.prev.is_some() && self.cur.is_some()
    }

    /// Evaluate `detector` on the window; false with fewer than two bars.
    pub fn matches(&self, detector: &dyn PatternDetector) -> bool {
        match (&self.prev, &self.cur) {
            (Some(prev), Some(cur)) => detector.detect(prev, cur),
            _ => false,
        }
    }
}
