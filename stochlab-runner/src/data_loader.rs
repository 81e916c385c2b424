//! Bar loading for the runner.
//!
//! Each fetch runs on its own thread and the caller waits at most
//! `timeout` for it. A fetch that overruns is abandoned; its thread
//! finishes in the background and its result is dropped. Providers built
//! with the same deadline (`YahooProvider::within_deadline`) bound how long
//! such a thread lives.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossbeam_channel::{bounded, RecvTimeoutError};
use log::debug;
use thiserror::Error;

use stochlab_core::data::{prepare_series, BarError, DataError, DataProvider};
use stochlab_core::domain::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch for '{symbol}' timed out after {timeout:?}")]
    Timeout { symbol: String, timeout: Duration },

    #[error("fetch thread for '{symbol}' exited without a result")]
    Disconnected { symbol: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("invalid series: {0}")]
    Invalid(#[from] BarError),
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// First date included.
    pub start: NaiveDate,
    /// First date excluded.
    pub end: NaiveDate,
    pub timeout: Duration,
}

/// Fetch one symbol with a deadline, then prepare the series.
///
/// An empty `Ok` means the provider had nothing for the symbol.
pub fn load_bars(
    provider: &Arc<dyn DataProvider>,
    symbol: &str,
    opts: &LoadOptions,
) -> Result<Vec<Bar>, LoadError> {
    let (tx, rx) = bounded(1);
    let worker = Arc::clone(provider);
    let owned = symbol.to_string();
    let LoadOptions { start, end, .. } = *opts;

    std::thread::spawn(move || {
        let result = worker.fetch(&owned, start, end);
        // The receiver is gone if the caller already timed out.
        let _ = tx.send(result);
    });

    let raw = match rx.recv_timeout(opts.timeout) {
        Ok(result) => result?,
        Err(RecvTimeoutError::Timeout) => {
            return Err(LoadError::Timeout {
                symbol: symbol.to_string(),
                timeout: opts.timeout,
            })
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(LoadError::Disconnected {
                symbol: symbol.to_string(),
            })
        }
    };

    let fetched = raw.len();
    let (bars, stats) = prepare_series(symbol, raw, start, end)?;
    debug!(
        "{symbol}: {} bars from {} ({fetched} fetched, {} dropped)",
        bars.len(),
        provider.name(),
        stats.dropped()
    );
    Ok(bars)
}
