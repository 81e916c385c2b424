//! Engine configuration, errors, and run result types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::StochasticConfig;
use crate::ledger::LedgerError;
use crate::strategy::{Direction, StrategyParams};

/// Configuration shared by both directions of a symbol run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Starting cash of each book and the notional budget per entry.
    pub stake: f64,
    pub stochastic: StochasticConfig,
    pub strategy: StrategyParams,
}

impl EngineConfig {
    pub fn new(stake: f64) -> Self {
        Self {
            stake,
            stochastic: StochasticConfig::default(),
            strategy: StrategyParams::default(),
        }
    }
}

/// Errors that abort one symbol's run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no bars for '{symbol}'")]
    NoBars { symbol: String },

    #[error("bars for '{symbol}' are not strictly increasing at {date}")]
    OutOfOrder { symbol: String, date: NaiveDate },

    #[error("indicator produced {readings} values for {bars} bars")]
    LengthMismatch { readings: usize, bars: usize },

    #[error("stake must be a positive finite amount, got {0}")]
    InvalidStake(f64),

    #[error("stochastic windows must all be >= 1, got {0:?}")]
    InvalidWindows(StochasticConfig),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Outcome of one (symbol, direction) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantResult {
    pub symbol: String,
    pub direction: Direction,
    pub initial_cash: f64,
    /// Cash plus position marked at the last bar's close.
    pub final_value: f64,
    pub final_position: i64,
    /// Executed orders (entries and exits).
    pub trade_count: usize,
    /// Signals whose computed size was zero and were not executed.
    pub skipped_signals: usize,
    pub bar_count: usize,
    pub warmup_bars: usize,
    /// Mark-to-market value after each bar.
    pub equity_curve: Vec<f64>,
}

/// Both books for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRun {
    pub symbol: String,
    pub long: VariantResult,
    pub short: VariantResult,
}
