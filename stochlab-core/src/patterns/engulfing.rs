//! Engulfing patterns: the current candle's body is larger than the
//! previous candle's body, with the current candle closing in the
//! pattern's direction.

use super::PatternDetector;
use crate::domain::Bar;

/// Current bar closes up and its body exceeds the previous bar's body.
pub fn is_bullish_engulfing(prev: &Bar, cur: &Bar) -> bool {
    cur.close > cur.open && cur.body().abs() > prev.body().abs()
}

/// Current bar closes down and its body exceeds the previous bar's body.
pub fn is_bearish_engulfing(prev: &Bar, cur: &Bar) -> bool {
    cur.close < cur.open && cur.body().abs() > prev.body().abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engulfing {
    Bullish,
    Bearish,
}

impl PatternDetector for Engulfing {
    fn name(&self) -> &str {
        match self {
            Self::Bullish => "bullish_engulfing",
            Self::Bearish => "bearish_engulfing",
        }
    }

    fn detect(&self, prev: &Bar, cur: &Bar) -> bool {
        match self {
            Self::Bullish => is_bullish_engulfing(prev, cur),
            Self::Bearish => is_bearish_engulfing(prev, cur),
        }
    }
}
