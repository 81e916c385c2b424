//! Batch orchestration.
//!
//! A batch validates its config, resets the ledger, then processes every
//! symbol independently: fetch with a deadline, prepare the series, run the
//! long and short books. Each symbol writes to its own in-memory ledger;
//! the buffers are merged into the shared sink in input-symbol order once
//! every symbol is done, so the file is identical whether symbols ran in
//! parallel or not.
//!
//! A symbol that fails for any reason, including a panic, is logged and
//! skipped. Only an invalid config or a ledger write failure aborts the batch.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{info, warn};
use rayon::prelude::*;
use thiserror::Error;

use stochlab_core::data::DataProvider;
use stochlab_core::engine::{run_symbol, EngineConfig};
use stochlab_core::ledger::{LedgerError, TradeLedger, TradeSink};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars, LoadError, LoadOptions};
use crate::result::{BatchReport, SkipReason, SkippedSymbol, SymbolOutcome, VariantValues};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Batch-level cancellation flag, shared between the caller and the batch.
///
/// Checked before each symbol starts; symbols already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

enum SymbolStatus {
    Done {
        outcome: SymbolOutcome,
        trades: TradeLedger,
    },
    Skipped(SkipReason),
}

/// Runs batches against one data provider.
pub struct Orchestrator {
    provider: Arc<dyn DataProvider>,
    cancel: CancelToken,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one batch, writing every executed order to `ledger`.
    pub fn run(
        &self,
        config: &BacktestConfig,
        ledger: &mut dyn TradeSink,
    ) -> Result<BatchReport, RunError> {
        let mut config = config.clone();
        config.normalize_symbols();
        config.validate()?;

        ledger.reset()?;

        let run_id = config.run_id();
        info!(
            "batch {}: {} symbols, {} to {}, stake {:.2}, provider {}",
            &run_id[..12],
            config.symbols.len(),
            config.start_date,
            config.end_date,
            config.stake,
            self.provider.name()
        );

        let engine = config.engine_config();
        let opts = LoadOptions {
            start: config.start_date,
            end: config.end_date,
            timeout: Duration::from_secs(config.fetch_timeout_secs),
        };
        let days = config.days();

        let statuses: Vec<SymbolStatus> = if config.parallel {
            config
                .symbols
                .par_iter()
                .map(|symbol| self.process_symbol(symbol, &engine, &opts, days))
                .collect()
        } else {
            config
                .symbols
                .iter()
                .map(|symbol| self.process_symbol(symbol, &engine, &opts, days))
                .collect()
        };

        let mut report = BatchReport {
            run_id,
            outcomes: BTreeMap::new(),
            skipped: Vec::new(),
            trade_count: 0,
            cancelled: self.cancel.is_cancelled(),
        };

        for (symbol, status) in config.symbols.iter().zip(statuses) {
            match status {
                SymbolStatus::Done {
                    outcome,
                    mut trades,
                } => {
                    report.trade_count += trades.drain_into(ledger)?;
                    report.outcomes.insert(symbol.clone(), outcome);
                }
                SymbolStatus::Skipped(reason) => report.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                }),
            }
        }
        ledger.flush()?;

        info!(
            "batch done: {} processed, {} skipped, {} trades",
            report.outcomes.len(),
            report.skipped.len(),
            report.trade_count
        );
        Ok(report)
    }

    fn process_symbol(
        &self,
        symbol: &str,
        engine: &EngineConfig,
        opts: &LoadOptions,
        days: i64,
    ) -> SymbolStatus {
        if self.cancel.is_cancelled() {
            return SymbolStatus::Skipped(SkipReason::Cancelled);
        }

        info!("{symbol}: fetching");
        let bars = match load_bars(&self.provider, symbol, opts) {
            Ok(bars) if bars.is_empty() => {
                warn!("{symbol}: no data, skipping");
                return SymbolStatus::Skipped(SkipReason::NoData);
            }
            Ok(bars) => bars,
            Err(e) => {
                warn!("{symbol}: {e}, skipping");
                let reason = match e {
                    LoadError::Timeout { .. } => SkipReason::TimedOut,
                    LoadError::Invalid(e) => SkipReason::InvalidSeries(e.to_string()),
                    other => SkipReason::FetchFailed(other.to_string()),
                };
                return SymbolStatus::Skipped(reason);
            }
        };

        let run = catch_unwind(AssertUnwindSafe(|| {
            let mut trades = TradeLedger::new();
            run_symbol(symbol, &bars, engine, &mut trades).map(|run| (run, trades))
        }));

        match run {
            Ok(Ok((run, trades))) => {
                info!(
                    "{symbol}: {} bars, long {:.2} ({} trades), short {:.2} ({} trades)",
                    bars.len(),
                    run.long.final_value,
                    run.long.trade_count,
                    run.short.final_value,
                    run.short.trade_count
                );
                SymbolStatus::Done {
                    outcome: SymbolOutcome::from_run(&run, days),
                    trades,
                }
            }
            Ok(Err(e)) => {
                warn!("{symbol}: {e}, skipping");
                SymbolStatus::Skipped(SkipReason::EngineFailed(e.to_string()))
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!("{symbol}: panicked: {message}, skipping");
                SymbolStatus::Skipped(SkipReason::Panicked(message))
            }
        }
    }
}

/// Run a batch with default strategy settings and return
/// `{symbol: {long_value, short_value}}`.
pub fn run_backtest(
    provider: Arc<dyn DataProvider>,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    stake: f64,
    ledger: &mut dyn TradeSink,
) -> Result<BTreeMap<String, VariantValues>, RunError> {
    let config = BacktestConfig::new(symbols.to_vec(), start, end, stake);
    let report = Orchestrator::new(provider).run(&config, ledger)?;
    Ok(report.values())
}
