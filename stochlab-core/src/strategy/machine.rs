//! Entry/exit state machine driven one bar at a time.

use serde::{Deserialize, Serialize};

use super::direction::{Direction, Zone};
use crate::domain::{Bar, TradeAction};
use crate::indicators::StochasticReading;
use crate::patterns::{PatternDetector, PatternWindow};

/// Thresholds shared by both directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Long entries need %K strictly above this level.
    pub lower_band: f64,
    /// Entries need %K strictly below this level.
    pub upper_band: f64,
    /// Confirming days required before the pattern can trigger an entry.
    pub confirm_days: u32,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            lower_band: 32.0,
            upper_band: 80.0,
            confirm_days: 3,
        }
    }
}

/// Counter and market flag for one (symbol, direction).
///
/// `days_met` grows by exactly one per confirming bar and drops to zero only
/// on an opposing bar. Neutral bars leave it untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    pub days_met: u32,
    pub in_market: bool,
}

/// Order the machine wants placed on the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Enter(TradeAction),
    Exit(TradeAction),
}

impl Signal {
    pub fn action(self) -> TradeAction {
        match self {
            Signal::Enter(action) | Signal::Exit(action) => action,
        }
    }
}

/// Stochastic-confirmation plus engulfing-trigger strategy for one book.
pub struct StrategyMachine {
    direction: Direction,
    params: StrategyParams,
    pattern: Box<dyn PatternDetector>,
    window: PatternWindow,
    state: SignalState,
}

impl StrategyMachine {
    /// Machine using the direction's engulfing pattern.
    pub fn new(direction: Direction, params: StrategyParams) -> Self {
        Self::with_pattern(direction, params, Box::new(direction.pattern()))
    }

    /// Machine with an injected entry pattern.
    pub fn with_pattern(
        direction: Direction,
        params: StrategyParams,
        pattern: Box<dyn PatternDetector>,
    ) -> Self {
        Self {
            direction,
            params,
            pattern,
            window: PatternWindow::new(),
            state: SignalState::default(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    /// Feed the next bar with its indicator reading.
    ///
    /// Every bar enters the pattern window; bars without a valid reading
    /// are otherwise skipped.
    pub fn on_bar(&mut self, bar: &Bar, reading: Option<StochasticReading>) -> Option<Signal> {
        self.window.push(bar);
        let reading = reading?;

        match self.direction.classify(reading, &self.params) {
            Zone::Confirming => {
                self.state.days_met += 1;
                if self.state.days_met >= self.params.confirm_days
                    && !self.state.in_market
                    && self.window.matches(self.pattern.as_ref())
                {
                    self.state.in_market = true;
                    return Some(Signal::Enter(self.direction.entry_action()));
                }
                None
            }
            Zone::Opposing => {
                self.state.days_met = 0;
                if self.state.in_market {
                    self.state.in_market = false;
                    return Some(Signal::Exit(self.direction.exit_action()));
                }
                None
            }
            Zone::Neutral => None,
        }
    }
}
