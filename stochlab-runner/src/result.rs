//! Batch results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use stochlab_core::engine::{SymbolRun, VariantResult};

use crate::config::RunId;

/// Final values of both books for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantValues {
    pub long_value: f64,
    pub short_value: f64,
}

/// Percentage return of a book over its stake.
pub fn return_pct(value: f64, stake: f64) -> f64 {
    (value - stake) / stake * 100.0
}

/// Return scaled to a year of 365.25 days.
///
/// Zero or negative spans yield 0.0.
pub fn annualized_return_pct(value: f64, stake: f64, days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    (value - stake) / stake * (365.25 / days as f64) * 100.0
}

/// Per-symbol summary kept in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolOutcome {
    pub long_value: f64,
    pub short_value: f64,
    pub long_trades: usize,
    pub short_trades: usize,
    pub bar_count: usize,
    pub long_return_pct: f64,
    pub short_return_pct: f64,
    pub long_annualized_pct: f64,
    pub short_annualized_pct: f64,
}

impl SymbolOutcome {
    pub fn from_run(run: &SymbolRun, days: i64) -> Self {
        let pct = |v: &VariantResult| return_pct(v.final_value, v.initial_cash);
        let ann = |v: &VariantResult| annualized_return_pct(v.final_value, v.initial_cash, days);
        Self {
            long_value: run.long.final_value,
            short_value: run.short.final_value,
            long_trades: run.long.trade_count,
            short_trades: run.short.trade_count,
            bar_count: run.long.bar_count,
            long_return_pct: pct(&run.long),
            short_return_pct: pct(&run.short),
            long_annualized_pct: ann(&run.long),
            short_annualized_pct: ann(&run.short),
        }
    }

    pub fn values(&self) -> VariantValues {
        VariantValues {
            long_value: self.long_value,
            short_value: self.short_value,
        }
    }
}

/// Why a symbol is missing from the outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    NoData,
    TimedOut,
    FetchFailed(String),
    InvalidSeries(String),
    EngineFailed(String),
    Panicked(String),
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data"),
            Self::TimedOut => f.write_str("fetch timed out"),
            Self::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            Self::InvalidSeries(e) => write!(f, "invalid series: {e}"),
            Self::EngineFailed(e) => write!(f, "backtest failed: {e}"),
            Self::Panicked(e) => write!(f, "panicked: {e}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Everything a batch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: RunId,
    pub outcomes: BTreeMap<String, SymbolOutcome>,
    /// In input order.
    pub skipped: Vec<SkippedSymbol>,
    /// Rows written to the ledger.
    pub trade_count: usize,
    pub cancelled: bool,
}

impl BatchReport {
    /// `{symbol: {long_value, short_value}}` for every processed symbol.
    pub fn values(&self) -> BTreeMap<String, VariantValues> {
        self.outcomes
            .iter()
            .map(|(symbol, outcome)| (symbol.clone(), outcome.values()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
