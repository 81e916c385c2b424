//! Offline provider reading one CSV file per symbol.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

use super::provider::{DataError, DataProvider};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: u64,
}

/// Reads `<dir>/<SYMBOL>.csv` with columns `date,open,high,low,close,volume`.
///
/// A missing file yields an empty series, the same outcome as an unknown
/// ticker on a live provider.
#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|source| DataError::Csv {
                symbol: symbol.to_string(),
                source,
            })?;

        let mut bars = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|source| DataError::Csv {
                symbol: symbol.to_string(),
                source,
            })?;
            if row.date >= start && row.date < end {
                bars.push(Bar::new(row.date, row.open, row.high, row.low, row.close, row.volume));
            }
        }
        Ok(bars)
    }
}
