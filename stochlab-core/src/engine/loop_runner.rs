//! Bar-by-bar loop of the backtesting engine.
//!
//! Per bar, in order:
//! 1. Strategy: feed the bar and its precomputed reading to the state machine
//! 2. Sizing: turn an entry or exit signal into a share count
//! 3. Execution: fill at the bar's close on the book's own portfolio
//! 4. Ledger: append the executed order
//! 5. Post-bar: mark-to-market into the equity curve

use log::{debug, warn};

use crate::domain::{Bar, Portfolio, TradeRecord};
use crate::indicators::StochasticReading;
use crate::ledger::TradeSink;
use crate::sizers::{FixedStakeSizer, Sizer};
use crate::strategy::{Direction, Signal, StrategyMachine};

use super::precompute::{compute_warmup, precompute_stochastic};
use super::state::{EngineConfig, EngineError, SymbolRun, VariantResult};

/// Reject empty or unordered series before anything is simulated.
pub fn check_series(symbol: &str, bars: &[Bar]) -> Result<(), EngineError> {
    if bars.is_empty() {
        return Err(EngineError::NoBars {
            symbol: symbol.to_string(),
        });
    }
    if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(EngineError::OutOfOrder {
            symbol: symbol.to_string(),
            date: pair[1].date,
        });
    }
    Ok(())
}

/// Run one direction over a symbol's bars.
///
/// `readings` must hold one entry per bar. The book starts with
/// `config.stake` in cash and no position.
pub fn run_variant(
    symbol: &str,
    bars: &[Bar],
    readings: &[Option<StochasticReading>],
    direction: Direction,
    config: &EngineConfig,
    sizer: &dyn Sizer,
    ledger: &mut dyn TradeSink,
) -> Result<VariantResult, EngineError> {
    check_series(symbol, bars)?;
    if readings.len() != bars.len() {
        return Err(EngineError::LengthMismatch {
            readings: readings.len(),
            bars: bars.len(),
        });
    }

    let mut portfolio = Portfolio::new(symbol, config.stake);
    let mut machine = StrategyMachine::new(direction, config.strategy);
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut trade_count = 0;
    let mut skipped_signals = 0;

    for (bar, reading) in bars.iter().zip(readings) {
        if let Some(signal) = machine.on_bar(bar, *reading) {
            let size = match signal {
                Signal::Enter(_) => sizer.entry_size(bar.close),
                Signal::Exit(_) => sizer.exit_size(portfolio.position()),
            };
            let action = signal.action();

            if size == 0 {
                warn!(
                    "{symbol} {direction}: {action} on {} sized to zero at {:.4}, not executed",
                    bar.date, bar.close
                );
                skipped_signals += 1;
            } else {
                portfolio.execute_order(action, bar.close, size);
                ledger.append(&TradeRecord {
                    date: bar.date,
                    symbol: symbol.to_string(),
                    action,
                    price: bar.close,
                    size,
                })?;
                trade_count += 1;
                debug!(
                    "{symbol} {direction}: {action} {size} @ {:.4} on {} (cash {:.2}, position {})",
                    bar.close,
                    bar.date,
                    portfolio.cash(),
                    portfolio.position().size
                );
            }
        }

        equity_curve.push(portfolio.value(bar.close));
    }

    let final_value = equity_curve.last().copied().unwrap_or(config.stake);

    Ok(VariantResult {
        symbol: symbol.to_string(),
        direction,
        initial_cash: config.stake,
        final_value,
        final_position: portfolio.position().size,
        trade_count,
        skipped_signals,
        bar_count: bars.len(),
        warmup_bars: compute_warmup(config.stochastic).min(bars.len()),
        equity_curve,
    })
}

/// Run both directions for one symbol, each on its own fresh book.
///
/// The indicator series is computed once and shared. Long runs first, so its
/// orders precede the short book's orders in the ledger.
pub fn run_symbol(
    symbol: &str,
    bars: &[Bar],
    config: &EngineConfig,
    ledger: &mut dyn TradeSink,
) -> Result<SymbolRun, EngineError> {
    if !config.stake.is_finite() || config.stake <= 0.0 {
        return Err(EngineError::InvalidStake(config.stake));
    }
    if !config.stochastic.is_valid() {
        return Err(EngineError::InvalidWindows(config.stochastic));
    }
    check_series(symbol, bars)?;

    let readings = precompute_stochastic(bars, config.stochastic);
    let sizer = FixedStakeSizer::new(config.stake);

    let long = run_variant(symbol, bars, &readings, Direction::Long, config, &sizer, ledger)?;
    let short = run_variant(symbol, bars, &readings, Direction::Short, config, &sizer, ledger)?;

    Ok(SymbolRun {
        symbol: symbol.to_string(),
        long,
        short,
    })
}
