//! Strategy polarity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::machine::StrategyParams;
use crate::domain::TradeAction;
use crate::indicators::StochasticReading;
use crate::patterns::Engulfing;

/// Which book a strategy instance trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

/// How a bar's reading affects the confirmation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Momentum agrees with the direction: count one more confirming day.
    Confirming,
    /// Momentum opposes the direction: reset the counter and exit.
    Opposing,
    /// Neither: leave the counter and position untouched.
    Neutral,
}

impl Direction {
    /// Classify a reading.
    ///
    /// Long confirms on `k > d` with `lower_band < k < upper_band` and
    /// opposes on `k < d`. Short confirms on `k < d` with `k < upper_band`
    /// and opposes on `k > d`. A `k > d` reading outside the band (long) is
    /// neutral, as is `k == d` for either side.
    pub fn classify(self, reading: StochasticReading, params: &StrategyParams) -> Zone {
        let StochasticReading { k, d } = reading;
        match self {
            Direction::Long => {
                if k > d && params.lower_band < k && k < params.upper_band {
                    Zone::Confirming
                } else if k < d {
                    Zone::Opposing
                } else {
                    Zone::Neutral
                }
            }
            Direction::Short => {
                if k < d && k < params.upper_band {
                    Zone::Confirming
                } else if k > d {
                    Zone::Opposing
                } else {
                    Zone::Neutral
                }
            }
        }
    }

    pub fn entry_action(self) -> TradeAction {
        match self {
            Direction::Long => TradeAction::Buy,
            Direction::Short => TradeAction::SellShort,
        }
    }

    pub fn exit_action(self) -> TradeAction {
        match self {
            Direction::Long => TradeAction::Sell,
            Direction::Short => TradeAction::BuyToCover,
        }
    }

    /// Engulfing pattern that confirms an entry.
    pub fn pattern(self) -> Engulfing {
        match self {
            Direction::Long => Engulfing::Bullish,
            Direction::Short => Engulfing::Bearish,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(k: f64, d: f64) -> StochasticReading {
        StochasticReading { k, d }
    }

    #[test]
    fn long_zones() {
        let p = StrategyParams::default();
        assert_eq!(Direction::Long.classify(reading(50.0, 40.0), &p), Zone::Confirming);
        assert_eq!(Direction::Long.classify(reading(40.0, 50.0), &p), Zone::Opposing);
        // Above d but outside the (32, 80) band.
        assert_eq!(Direction::Long.classify(reading(85.0, 70.0), &p), Zone::Neutral);
        assert_eq!(Direction::Long.classify(reading(20.0, 10.0), &p), Zone::Neutral);
        // Band edges are exclusive.
        assert_eq!(Direction::Long.classify(reading(32.0, 10.0), &p), Zone::Neutral);
        assert_eq!(Direction::Long.classify(reading(80.0, 10.0), &p), Zone::Neutral);
        assert_eq!(Direction::Long.classify(reading(50.0, 50.0), &p), Zone::Neutral);
    }

    #[test]
    fn short_zones() {
        let p = StrategyParams::default();
        assert_eq!(Direction::Short.classify(reading(40.0, 50.0), &p), Zone::Confirming);
        // No lower band on the short side.
        assert_eq!(Direction::Short.classify(reading(5.0, 50.0), &p), Zone::Confirming);
        assert_eq!(Direction::Short.classify(reading(50.0, 40.0), &p), Zone::Opposing);
        assert_eq!(Direction::Short.classify(reading(85.0, 90.0), &p), Zone::Neutral);
        assert_eq!(Direction::Short.classify(reading(50.0, 50.0), &p), Zone::Neutral);
    }

    #[test]
    fn action_pairs() {
        assert_eq!(Direction::Long.entry_action(), TradeAction::Buy);
        assert_eq!(Direction::Long.exit_action(), TradeAction::Sell);
        assert_eq!(Direction::Short.entry_action(), TradeAction::SellShort);
        assert_eq!(Direction::Short.exit_action(), TradeAction::BuyToCover);
    }

    #[test]
    fn patterns_match_polarity() {
        assert_eq!(Direction::Long.pattern(), Engulfing::Bullish);
        assert_eq!(Direction::Short.pattern(), Engulfing::Bearish);
    }
}
