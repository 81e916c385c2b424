//! Export: JSON batch report and the stochastic indicator dump.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use stochlab_core::data::DataProvider;
use stochlab_core::domain::Bar;
use stochlab_core::indicators::{Stochastic, StochasticConfig};

use crate::data_loader::{load_bars, LoadOptions};
use crate::result::BatchReport;

// ─── JSON export ────────────────────────────────────────────────────

/// Write the report as pretty JSON.
pub fn write_report_json(report: &BatchReport, path: &Path) -> Result<()> {
    let json = report
        .to_json()
        .context("failed to serialize batch report to JSON")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Stochastic dump ────────────────────────────────────────────────

/// One bar of the indicator dump. Invalid bars leave `k` and `d` empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub k: Option<f64>,
    pub d: Option<f64>,
}

/// Smoothed %K and %D for every bar of one symbol.
pub fn stochastic_rows(symbol: &str, bars: &[Bar], config: StochasticConfig) -> Vec<StochasticRow> {
    Stochastic::new(config)
        .lines(bars)
        .into_iter()
        .zip(bars)
        .map(|(line, bar)| StochasticRow {
            date: bar.date,
            ticker: symbol.to_string(),
            k: line.k,
            d: line.d,
        })
        .collect()
}

/// Render rows as CSV with a `date,ticker,k,d` header.
pub fn stochastic_csv(rows: &[StochasticRow]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(["date", "ticker", "k", "d"])?;
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Load every symbol and write all of their rows to one CSV file.
///
/// Symbols that fail to load are logged and left out. Returns the number of
/// rows written.
pub fn dump_stochastic(
    provider: &Arc<dyn DataProvider>,
    symbols: &[String],
    opts: &LoadOptions,
    config: StochasticConfig,
    path: &Path,
) -> Result<usize> {
    let mut rows = Vec::new();
    for symbol in symbols {
        match load_bars(provider, symbol, opts) {
            Ok(bars) if bars.is_empty() => warn!("{symbol}: no data, skipping"),
            Ok(bars) => rows.extend(stochastic_rows(symbol, &bars, config)),
            Err(e) => warn!("{symbol}: {e}, skipping"),
        }
    }

    let csv = stochastic_csv(&rows)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {} stochastic rows to {}", rows.len(), path.display());
    Ok(rows.len())
}
