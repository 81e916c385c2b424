//! StochLab CLI: batch backtests and indicator dumps.
//!
//! Commands:
//! - `run`: backtest the long and short stochastic/engulfing books for a
//!   list of symbols and write the trade ledger
//! - `stochastic`: write smoothed %K/%D per bar for a list of symbols

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;

use stochlab_core::data::{CsvDirProvider, DataProvider, SyntheticProvider, YahooProvider};
use stochlab_core::indicators::StochasticConfig;
use stochlab_runner::{
    dump_stochastic, write_report_json, BacktestConfig, BatchReport, CsvLedger, LoadOptions,
    Orchestrator,
};

#[derive(Parser)]
#[command(
    name = "stochlab",
    about = "StochLab CLI, a stochastic/engulfing daily-bar backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where bars come from and which symbols to load.
#[derive(Args)]
struct DataArgs {
    /// Comma-separated symbols (e.g., SPY,QQQ,AAPL).
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// File with symbols, one per line or comma-separated; `#` starts a comment.
    #[arg(long)]
    symbols_file: Option<PathBuf>,

    /// Start date (YYYY-MM-DD), inclusive. Defaults to 5 years ago.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), exclusive. Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Read `<dir>/<SYMBOL>.csv` instead of downloading.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Use synthetic random-walk data (development only).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Per-symbol fetch timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest both books for each symbol and write the trade ledger.
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Path to a TOML config file. Flags given on the command line override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Starting cash per book and notional per entry.
        #[arg(long)]
        stake: Option<f64>,

        /// Trade ledger path. Defaults to trades.csv.
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Process symbols one after another.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Print the full report as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the JSON report to this file.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write date,ticker,k,d rows for each symbol.
    Stochastic {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = 92)]
        length_k: usize,

        #[arg(long, default_value_t = 18)]
        smooth_k: usize,

        #[arg(long, default_value_t = 18)]
        smooth_d: usize,

        /// Output CSV path.
        #[arg(long, default_value = "stochastic.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            config,
            stake,
            ledger,
            sequential,
            json,
            report,
        } => run_backtest_cmd(data, config, stake, ledger, sequential, json, report.as_deref()),
        Commands::Stochastic {
            data,
            length_k,
            smooth_k,
            smooth_d,
            output,
        } => run_stochastic_cmd(data, StochasticConfig::new(length_k, smooth_k, smooth_d), &output),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn default_start() -> NaiveDate {
    chrono::Local::now().date_naive() - chrono::Duration::days(365 * 5)
}

fn default_end() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn read_symbols_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read symbols file {}", path.display()))?;
    Ok(parse_symbol_list(&content))
}

fn parse_symbol_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DataArgs {
    fn symbols(&self) -> Result<Vec<String>> {
        let mut symbols = self.symbols.clone();
        if let Some(path) = &self.symbols_file {
            symbols.extend(read_symbols_file(path)?);
        }
        Ok(symbols)
    }

    fn provider(&self, timeout_secs: u64) -> Result<Arc<dyn DataProvider>> {
        if self.synthetic && self.data_dir.is_some() {
            bail!("--synthetic and --data-dir are mutually exclusive");
        }
        let provider: Arc<dyn DataProvider> = if self.synthetic {
            log::warn!("using synthetic data: results are not real market outcomes");
            Arc::new(SyntheticProvider::new())
        } else if let Some(dir) = &self.data_dir {
            Arc::new(CsvDirProvider::new(dir))
        } else {
            Arc::new(YahooProvider::within_deadline(Duration::from_secs(timeout_secs))?)
        };
        Ok(provider)
    }
}

fn run_backtest_cmd(
    data: DataArgs,
    config_path: Option<PathBuf>,
    stake: Option<f64>,
    ledger_path: Option<PathBuf>,
    sequential: bool,
    json: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let symbols = data.symbols()?;

    let mut config = match &config_path {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::new(
            Vec::new(),
            default_start(),
            default_end(),
            stake.unwrap_or(10_000.0),
        ),
    };
    if !symbols.is_empty() {
        config.symbols = symbols;
    }
    if let Some(start) = &data.start {
        config.start_date = parse_date(start)?;
    }
    if let Some(end) = &data.end {
        config.end_date = parse_date(end)?;
    }
    if let Some(stake) = stake {
        config.stake = stake;
    }
    if let Some(path) = ledger_path {
        config.ledger_path = path;
    }
    if let Some(timeout) = data.timeout {
        config.fetch_timeout_secs = timeout;
    }
    if sequential {
        config.parallel = false;
    }

    config.normalize_symbols();
    config.validate()?;

    let provider = data.provider(config.fetch_timeout_secs)?;
    let mut ledger = CsvLedger::create(&config.ledger_path)
        .with_context(|| format!("failed to create ledger {}", config.ledger_path.display()))?;

    let report = Orchestrator::new(provider).run(&config, &mut ledger)?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }
    if let Some(path) = report_path {
        write_report_json(&report, path)?;
        info!("report: {}", path.display());
    }
    info!(
        "ledger: {} ({} trades)",
        config.ledger_path.display(),
        report.trade_count
    );

    Ok(())
}

fn run_stochastic_cmd(data: DataArgs, config: StochasticConfig, output: &Path) -> Result<()> {
    if !config.is_valid() {
        bail!("stochastic windows must all be >= 1");
    }
    let symbols = data.symbols()?;
    if symbols.is_empty() {
        bail!("no symbols given (use --symbols or --symbols-file)");
    }
    let start = data.start.as_deref().map(parse_date).transpose()?.unwrap_or_else(default_start);
    let end = data.end.as_deref().map(parse_date).transpose()?.unwrap_or_else(default_end);
    if start >= end {
        bail!("start date {start} must be before end date {end}");
    }

    let timeout = data.timeout.unwrap_or(30);
    let provider = data.provider(timeout)?;
    let opts = LoadOptions {
        start,
        end,
        timeout: Duration::from_secs(timeout),
    };

    let rows = dump_stochastic(&provider, &symbols, &opts, config, output)?;
    println!("Wrote {rows} rows to {}", output.display());
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("=== Batch {} ===", &report.run_id[..12]);
    println!(
        "{:<10} {:>6} {:>14} {:>9} {:>6} {:>14} {:>9} {:>6}",
        "Symbol", "Bars", "Long value", "Long %", "Trades", "Short value", "Short %", "Trades"
    );
    for (symbol, o) in &report.outcomes {
        println!(
            "{:<10} {:>6} {:>14.2} {:>8.2}% {:>6} {:>14.2} {:>8.2}% {:>6}",
            symbol,
            o.bar_count,
            o.long_value,
            o.long_return_pct,
            o.long_trades,
            o.short_value,
            o.short_return_pct,
            o.short_trades
        );
    }
    if !report.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.symbol, skipped.reason);
        }
    }
    if report.cancelled {
        println!("(batch cancelled)");
    }
    println!();
    println!("Trades written: {}", report.trade_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_list_accepts_lines_commas_and_comments() {
        let content = "SPY, QQQ\n# indexes above\nAAPL # apple\n\n  MSFT  \n";
        assert_eq!(parse_symbol_list(content), vec!["SPY", "QQQ", "AAPL", "MSFT"]);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert_eq!(parse_date("2024-01-31").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "stochlab",
            "run",
            "--symbols",
            "SPY,QQQ",
            "--start",
            "2020-01-01",
            "--stake",
            "5000",
            "--sequential",
            "--report",
            "out/report.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                data,
                stake,
                sequential,
                report,
                ..
            } => {
                assert_eq!(data.symbols, vec!["SPY", "QQQ"]);
                assert_eq!(stake, Some(5000.0));
                assert!(sequential);
                assert_eq!(report, Some(PathBuf::from("out/report.json")));
            }
            Commands::Stochastic { .. } => panic!("expected run"),
        }
    }
}
