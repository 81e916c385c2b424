//! Backtesting engine: bar-by-bar loop for one symbol.
//!
//! The engine consumes a prepared bar series and the precomputed stochastic
//! readings, then runs each direction on its own book:
//!
//! 1. Strategy: classify the reading, count confirming days, detect the pattern
//! 2. Sizing: fixed-stake entries, full-position exits
//! 3. Execution: immediate full fill at the close
//! 4. Post-bar: mark-to-market

pub mod loop_runner;
pub mod precompute;
pub mod state;

pub use loop_runner::{check_series, run_symbol, run_variant};
pub use precompute::{compute_warmup, precompute_stochastic};
pub use state::{EngineConfig, EngineError, SymbolRun, VariantResult};
