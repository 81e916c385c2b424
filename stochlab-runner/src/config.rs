//! Serializable batch configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stochlab_core::engine::EngineConfig;
use stochlab_core::indicators::StochasticConfig;
use stochlab_core::strategy::StrategyParams;

/// Unique identifier for a batch (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no symbols to backtest")]
    NoSymbols,

    #[error("stake must be a positive finite amount, got {0}")]
    InvalidStake(f64),

    #[error("start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("stochastic windows must all be >= 1 (got {length_k}/{smooth_k}/{smooth_d})")]
    InvalidWindows {
        length_k: usize,
        smooth_k: usize,
        smooth_d: usize,
    },

    #[error("lower band {lower} must be below upper band {upper}")]
    InvalidBands { lower: f64, upper: f64 },

    #[error("confirm_days must be >= 1")]
    InvalidConfirmDays,

    #[error("fetch timeout must be >= 1 second")]
    InvalidTimeout,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("trades.csv")
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_parallel() -> bool {
    true
}

/// Everything needed to reproduce a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub symbols: Vec<String>,

    /// First date included.
    pub start_date: NaiveDate,

    /// First date excluded.
    pub end_date: NaiveDate,

    /// Starting cash of every book and the notional per entry.
    pub stake: f64,

    #[serde(default)]
    pub stochastic: StochasticConfig,

    #[serde(default)]
    pub strategy: StrategyParams,

    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Run symbols on the rayon pool instead of one after another.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl BacktestConfig {
    pub fn new(symbols: Vec<String>, start_date: NaiveDate, end_date: NaiveDate, stake: f64) -> Self {
        Self {
            symbols,
            start_date,
            end_date,
            stake,
            stochastic: StochasticConfig::default(),
            strategy: StrategyParams::default(),
            ledger_path: default_ledger_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            parallel: default_parallel(),
        }
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Trim symbols, drop blanks and repeats (first occurrence wins).
    pub fn normalize_symbols(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.symbols = self
            .symbols
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
    }

    /// Reject a config that cannot produce a meaningful batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoSymbols);
        }
        if !self.stake.is_finite() || self.stake <= 0.0 {
            return Err(ConfigError::InvalidStake(self.stake));
        }
        if self.start_date >= self.end_date {
            return Err(ConfigError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if !self.stochastic.is_valid() {
            let StochasticConfig {
                length_k,
                smooth_k,
                smooth_d,
            } = self.stochastic;
            return Err(ConfigError::InvalidWindows {
                length_k,
                smooth_k,
                smooth_d,
            });
        }
        let StrategyParams {
            lower_band,
            upper_band,
            confirm_days,
        } = self.strategy;
        if !(lower_band < upper_band) {
            return Err(ConfigError::InvalidBands {
                lower: lower_band,
                upper: upper_band,
            });
        }
        if confirm_days == 0 {
            return Err(ConfigError::InvalidConfirmDays);
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            stake: self.stake,
            stochastic: self.stochastic,
            strategy: self.strategy,
        }
    }

    /// Calendar days covered by the batch.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Deterministic BLAKE3 fingerprint of everything that affects results.
    ///
    /// Output location and scheduling (`ledger_path`, `parallel`,
    /// `fetch_timeout_secs`) are excluded.
    pub fn run_id(&self) -> RunId {
        let mut hasher = blake3::Hasher::new();
        for symbol in &self.symbols {
            hasher.update(symbol.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(self.start_date.to_string().as_bytes());
        hasher.update(self.end_date.to_string().as_bytes());
        hasher.update(&self.stake.to_le_bytes());
        for window in [
            self.stochastic.length_k,
            self.stochastic.smooth_k,
            self.stochastic.smooth_d,
        ] {
            hasher.update(&(window as u64).to_le_bytes());
        }
        hasher.update(&self.strategy.lower_band.to_le_bytes());
        hasher.update(&self.strategy.upper_band.to_le_bytes());
        hasher.update(&self.strategy.confirm_days.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn valid() -> BacktestConfig {
        BacktestConfig::new(vec!["SPY".into()], d(2020, 1, 1), d(2021, 1, 1), 10_000.0)
    }

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let toml = r#"
            symbols = ["SPY", "QQQ"]
            start_date = "2020-01-01"
            end_date = "2021-01-01"
            stake = 10000.0
        "#;
        let cfg = BacktestConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.symbols, vec!["SPY", "QQQ"]);
        assert_eq!(cfg.stochastic, StochasticConfig::default());
        assert_eq!(cfg.strategy, StrategyParams::default());
        assert_eq!(cfg.ledger_path, PathBuf::from("trades.csv"));
        assert_eq!(cfg.fetch_timeout_secs, 30);
        assert!(cfg.parallel);
        cfg.validate().unwrap();
    }

    #[test]
    fn parses_nested_tables() {
        let toml = r#"
            symbols = ["SPY"]
            start_date = "2020-01-01"
            end_date = "2021-01-01"
            stake = 5000.0
            parallel = false

            [stochastic]
            length_k = 14
            smooth_k = 3

            [strategy]
            confirm_days = 2
        "#;
        let cfg = BacktestConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.stochastic, StochasticConfig::new(14, 3, 18));
        assert_eq!(cfg.strategy.confirm_days, 2);
        assert_eq!(cfg.strategy.upper_band, 80.0);
        assert!(!cfg.parallel);
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            BacktestConfig::from_toml("symbols = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validation_rejects_each_bad_field() {
        let mut cfg = valid();
        cfg.symbols = vec!["  ".into()];
        assert!(matches!(cfg.validate(), Err(ConfigError::NoSymbols)));

        let mut cfg = valid();
        cfg.stake = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidStake(_))));

        let mut cfg = valid();
        cfg.stake = f64::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidStake(_))));

        let mut cfg = valid();
        cfg.end_date = cfg.start_date;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDateRange { .. })
        ));

        let mut cfg = valid();
        cfg.stochastic.smooth_d = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidWindows { .. })));

        let mut cfg = valid();
        cfg.strategy.lower_band = 90.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidBands { .. })));

        let mut cfg = valid();
        cfg.strategy.confirm_days = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidConfirmDays)));

        let mut cfg = valid();
        cfg.fetch_timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn normalize_trims_and_dedupes() {
        let mut cfg = valid();
        cfg.symbols = vec![" SPY ".into(), "".into(), "QQQ".into(), "SPY".into()];
        cfg.normalize_symbols();
        assert_eq!(cfg.symbols, vec!["SPY", "QQQ"]);
    }

    #[test]
    fn run_id_is_deterministic_and_ignores_output_path() {
        let a = valid();
        let mut b = valid();
        b.ledger_path = PathBuf::from("elsewhere.csv");
        b.parallel = false;
        assert_eq!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 64);

        let mut c = valid();
        c.stake = 20_000.0;
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn days_spans_range() {
        assert_eq!(valid().days(), 366);
    }
}
