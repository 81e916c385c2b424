//! Trade ledger: append-only record of executed orders.

use thiserror::Error;

use crate::domain::TradeRecord;

/// Ledger column names, in file order.
pub const LEDGER_HEADER: [&str; 5] = ["date", "stock", "action", "price", "size"];

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for executed orders.
///
/// A sink is scoped to one batch: `reset` empties it down to the header,
/// then records are appended in execution order.
pub trait TradeSink: Send {
    fn reset(&mut self) -> Result<(), LedgerError>;

    fn append(&mut self, record: &TradeRecord) -> Result<(), LedgerError>;

    fn flush(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// In-memory ledger.
///
/// Used as the per-symbol buffer during a batch and as a sink in tests.
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    records: Vec<TradeRecord>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy every record into `sink`, preserving order.
    pub fn drain_into(&mut self, sink: &mut dyn TradeSink) -> Result<usize, LedgerError> {
        let count = self.records.len();
        for record in self.records.drain(..) {
            sink.append(&record)?;
        }
        Ok(count)
    }
}

impl TradeSink for TradeLedger {
    fn reset(&mut self) -> Result<(), LedgerError> {
        self.records.clear();
        Ok(())
    }

    fn append(&mut self, record: &TradeRecord) -> Result<(), LedgerError> {
        self.records.push(record.clone());
        Ok(())
    }
}
