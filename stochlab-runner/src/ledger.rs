//! Trade ledger file: `date,stock,action,price,size`, one row per executed order.

use std::fs::File;
use std::path::{Path, PathBuf};

use stochlab_core::domain::TradeRecord;
use stochlab_core::ledger::{LedgerError, TradeSink, LEDGER_HEADER};

/// CSV file sink. `reset` truncates the file and writes the header row.
pub struct CsvLedger {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvLedger {
    /// Create (or truncate) the ledger file with just the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let writer = Self::open_truncated(&path)?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    fn open_truncated(path: &Path) -> Result<csv::Writer<File>, LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(LEDGER_HEADER)?;
        writer.flush()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written since the last reset.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl TradeSink for CsvLedger {
    fn reset(&mut self) -> Result<(), LedgerError> {
        // Nothing may be left buffered for the old handle once the file is truncated.
        self.writer.flush()?;
        self.writer = Self::open_truncated(&self.path)?;
        self.rows = 0;
        Ok(())
    }

    fn append(&mut self, record: &TradeRecord) -> Result<(), LedgerError> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LedgerError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read a ledger file back into records.
pub fn read_ledger(path: impl AsRef<Path>) -> Result<Vec<TradeRecord>, LedgerError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
