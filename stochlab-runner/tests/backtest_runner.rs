//! Integration tests for the runner: batches over in-memory, CSV and
//! synthetic providers, written to a real ledger file.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use stochlab_core::data::{CsvDirProvider, DataProvider, MemoryProvider, SyntheticProvider};
use stochlab_core::domain::{Bar, TradeAction};
use stochlab_core::indicators::StochasticConfig;
use stochlab_core::ledger::TradeLedger;
use stochlab_runner::{
    read_ledger, run_backtest, BacktestConfig, CsvLedger, Orchestrator, RunError, SkipReason,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Every bar spans 90..110; with windows 3/1/3 the long book buys 98 @ 102
/// on Feb 7 and sells them @ 91 on Feb 8.
fn scenario_bars() -> Vec<Bar> {
    let candles = [
        (95.0, 95.0),
        (95.0, 95.0),
        (92.0, 92.0),
        (94.0, 94.0),
        (97.0, 98.0),
        (99.5, 100.0),
        (100.0, 102.0),
        (101.0, 91.0),
    ];
    candles
        .iter()
        .enumerate()
        .map(|(i, &(open, close))| {
            Bar::new(d(2024, 2, 1) + chrono::Duration::days(i as i64), open, 110.0, 90.0, close, 1000)
        })
        .collect()
}

fn scenario_config(symbols: &[&str]) -> BacktestConfig {
    let mut cfg = BacktestConfig::new(
        symbols.iter().map(|s| s.to_string()).collect(),
        d(2024, 1, 1),
        d(2024, 3, 1),
        10_000.0,
    );
    cfg.stochastic = StochasticConfig::new(3, 1, 3);
    cfg
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn scenario_batch_writes_expected_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");
    let provider: Arc<dyn DataProvider> =
        Arc::new(MemoryProvider::new().with_series("TEST", scenario_bars()));

    let mut ledger = CsvLedger::create(&path).unwrap();
    let report = Orchestrator::new(provider)
        .run(&scenario_config(&["TEST"]), &mut ledger)
        .unwrap();

    assert_eq!(
        read_lines(&path),
        vec![
            "date,stock,action,price,size",
            "2024-02-07,TEST,Buy,102.0,98",
            "2024-02-08,TEST,Sell,91.0,98",
        ]
    );
    assert_eq!(report.trade_count, 2);

    let outcome = &report.outcomes["TEST"];
    assert_eq!(outcome.long_value, 8_922.0);
    assert_eq!(outcome.short_value, 10_000.0);
    assert_eq!(outcome.long_trades, 2);
    assert_eq!(outcome.bar_count, 8);
    assert!((outcome.long_return_pct - (-10.78)).abs() < 1e-9);
}

#[test]
fn unknown_ticker_is_skipped_and_others_processed() {
    let provider: Arc<dyn DataProvider> =
        Arc::new(MemoryProvider::new().with_series("TEST", scenario_bars()));
    let mut ledger = TradeLedger::new();
    let report = Orchestrator::new(provider)
        .run(&scenario_config(&["NOPE", "TEST"]), &mut ledger)
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcomes.contains_key("TEST"));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].symbol, "NOPE");
    assert_eq!(report.skipped[0].reason, SkipReason::NoData);
}

#[test]
fn zero_trade_batch_leaves_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");
    // Too short for the default 92/18/18 windows.
    let provider: Arc<dyn DataProvider> =
        Arc::new(MemoryProvider::new().with_series("TEST", scenario_bars()));

    let mut ledger = CsvLedger::create(&path).unwrap();
    let cfg = BacktestConfig::new(vec!["TEST".into()], d(2024, 1, 1), d(2024, 3, 1), 10_000.0);
    let report = Orchestrator::new(provider).run(&cfg, &mut ledger).unwrap();

    assert_eq!(read_lines(&path), vec!["date,stock,action,price,size"]);
    assert_eq!(report.outcomes["TEST"].long_value, 10_000.0);
    assert_eq!(report.outcomes["TEST"].short_value, 10_000.0);
}

#[test]
fn each_batch_truncates_the_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");
    let provider: Arc<dyn DataProvider> =
        Arc::new(MemoryProvider::new().with_series("TEST", scenario_bars()));
    let orchestrator = Orchestrator::new(provider);
    let mut ledger = CsvLedger::create(&path).unwrap();

    orchestrator.run(&scenario_config(&["TEST"]), &mut ledger).unwrap();
    orchestrator.run(&scenario_config(&["TEST"]), &mut ledger).unwrap();

    assert_eq!(read_ledger(&path).unwrap().len(), 2);
}

#[test]
fn invalid_config_does_not_touch_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");
    let provider: Arc<dyn DataProvider> =
        Arc::new(MemoryProvider::new().with_series("TEST", scenario_bars()));
    let orchestrator = Orchestrator::new(provider);
    let mut ledger = CsvLedger::create(&path).unwrap();
    orchestrator.run(&scenario_config(&["TEST"]), &mut ledger).unwrap();

    let mut bad = scenario_config(&["TEST"]);
    bad.stake = -1.0;
    let err = orchestrator.run(&bad, &mut ledger).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
    assert_eq!(read_ledger(&path).unwrap().len(), 2);
}

#[test]
fn parallel_and_sequential_ledgers_match() {
    let symbols: Vec<String> = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let provider: Arc<dyn DataProvider> = Arc::new(SyntheticProvider::new());
    let mut cfg = BacktestConfig::new(symbols.clone(), d(2015, 1, 1), d(2020, 1, 1), 10_000.0);
    cfg.stochastic = StochasticConfig::new(14, 3, 3);

    let orchestrator = Orchestrator::new(provider);

    cfg.parallel = true;
    let mut parallel = TradeLedger::new();
    let par_report = orchestrator.run(&cfg, &mut parallel).unwrap();

    cfg.parallel = false;
    let mut sequential = TradeLedger::new();
    let seq_report = orchestrator.run(&cfg, &mut sequential).unwrap();

    assert_eq!(parallel.records(), sequential.records());
    assert_eq!(par_report.values(), seq_report.values());
    assert_eq!(par_report.outcomes.len(), symbols.len());

    // Records are grouped by symbol in input order.
    let mut order: Vec<&str> = Vec::new();
    for record in parallel.records() {
        if order.last() != Some(&record.symbol.as_str()) {
            order.push(&record.symbol);
        }
    }
    let mut expected: Vec<&str> = symbols.iter().map(String::as_str).collect();
    expected.retain(|s| order.contains(s));
    assert_eq!(order, expected);
}

#[test]
fn csv_directory_provider_end_to_end() {
    let data_dir = tempfile::tempdir().unwrap();
    let mut wtr = csv::Writer::from_path(data_dir.path().join("TEST.csv")).unwrap();
    for bar in scenario_bars() {
        wtr.serialize(&bar).unwrap();
    }
    wtr.flush().unwrap();

    let provider: Arc<dyn DataProvider> = Arc::new(CsvDirProvider::new(data_dir.path()));
    let mut ledger = TradeLedger::new();
    let report = Orchestrator::new(provider)
        .run(&scenario_config(&["TEST", "MISSING"]), &mut ledger)
        .unwrap();

    let actions: Vec<_> = ledger.records().iter().map(|r| r.action).collect();
    assert_eq!(actions, vec![TradeAction::Buy, TradeAction::Sell]);
    assert_eq!(report.skipped[0].symbol, "MISSING");
}

#[test]
fn run_backtest_returns_value_map() {
    let provider: Arc<dyn DataProvider> =
        Arc::new(MemoryProvider::new().with_series("TEST", scenario_bars()));
    let mut ledger = TradeLedger::new();
    let values = run_backtest(
        provider,
        &["TEST".to_string(), "NOPE".to_string()],
        d(2024, 1, 1),
        d(2024, 3, 1),
        10_000.0,
        &mut ledger,
    )
    .unwrap();

    // Default windows need 143 bars, so nothing trades.
    assert_eq!(values.len(), 1);
    assert_eq!(values["TEST"].long_value, 10_000.0);
    assert_eq!(values["TEST"].short_value, 10_000.0);
    assert!(ledger.is_empty());
}

#[test]
fn run_backtest_rejects_bad_input_before_simulation() {
    let provider: Arc<dyn DataProvider> = Arc::new(MemoryProvider::new());
    let mut ledger = TradeLedger::new();
    let err = run_backtest(provider, &[], d(2024, 1, 1), d(2024, 3, 1), 10_000.0, &mut ledger)
        .unwrap_err();
    assert!(matches!(err, RunError::Config(_)));

    let provider: Arc<dyn DataProvider> = Arc::new(MemoryProvider::new());
    let err = run_backtest(
        provider,
        &["SPY".to_string()],
        d(2024, 3, 1),
        d(2024, 1, 1),
        10_000.0,
        &mut ledger,
    )
    .unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}
