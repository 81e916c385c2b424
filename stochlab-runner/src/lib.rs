//! StochLab Runner: batch orchestration, data loading, ledger file, reports.
//!
//! This crate builds on `stochlab-core` to provide:
//! - Serializable, validated batch configuration
//! - Bar loading with a per-fetch deadline
//! - Per-symbol isolation and parallel execution
//! - CSV trade ledger merged in input-symbol order
//! - JSON reports and the stochastic indicator dump

pub mod config;
pub mod data_loader;
pub mod export;
pub mod ledger;
pub mod result;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_bars, LoadError, LoadOptions};
pub use export::{dump_stochastic, stochastic_csv, stochastic_rows, write_report_json, StochasticRow};
pub use ledger::{read_ledger, CsvLedger};
pub use result::{
    annualized_return_pct, return_pct, BatchReport, SkipReason, SkippedSymbol, SymbolOutcome,
    VariantValues,
};
pub use runner::{run_backtest, CancelToken, Orchestrator, RunError};
