//! Data providers and series preparation.

pub mod csv_dir;
pub mod ingest;
pub mod memory;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_dir::CsvDirProvider;
pub use ingest::{prepare_series, BarError, PrepareStats};
pub use memory::MemoryProvider;
pub use provider::{DataError, DataProvider};
pub use synthetic::{generate_synthetic_bars, SyntheticProvider};
pub use yahoo::YahooProvider;
