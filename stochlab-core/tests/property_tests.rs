//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Sizing: entry size is the largest whole share count within the stake
//! 2. Accounting: a round trip changes cash by exactly size * price move
//! 3. Counter: days_met only grows by one or resets to zero
//! 4. Single position: entries and exits alternate, exits close the entry

use chrono::NaiveDate;
use proptest::prelude::*;
use stochlab_core::domain::{Bar, Portfolio, TradeAction};
use stochlab_core::engine::{run_symbol, EngineConfig};
use stochlab_core::indicators::{StochasticConfig, StochasticReading};
use stochlab_core::ledger::TradeLedger;
use stochlab_core::sizers::{FixedStakeSizer, Sizer};
use stochlab_core::strategy::{Direction, StrategyMachine, StrategyParams, Zone};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_stake() -> impl Strategy<Value = f64> {
    (100.0..1_000_000.0_f64).prop_map(|s| s.round())
}

fn arb_reading() -> impl Strategy<Value = Option<StochasticReading>> {
    prop::option::weighted(0.9, (0.0..100.0_f64, 0.0..100.0_f64))
        .prop_map(|rd| rd.map(|(k, d)| StochasticReading { k, d }))
}

fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-3.0..3.0_f64, -3.0..3.0_f64), 1..max_len).prop_map(|moves| {
        let base = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        let mut price = 100.0_f64;
        moves
            .into_iter()
            .enumerate()
            .map(|(i, (gap, body))| {
                let open = (price + gap).max(5.0);
                let close = (open + body).max(5.0);
                price = close;
                Bar::new(
                    base + chrono::Duration::days(i as i64),
                    open,
                    open.max(close) + 0.5,
                    open.min(close) - 0.5,
                    close,
                    1000,
                )
            })
            .collect()
    })
}

// ── 1. Sizing ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn entry_size_is_floor_of_stake_over_price(stake in arb_stake(), price in arb_price()) {
        let size = FixedStakeSizer::new(stake).entry_size(price);
        prop_assert!(size as f64 * price <= stake + 1e-6);
        prop_assert!((size + 1) as f64 * price > stake - 1e-6);
    }
}

// ── 2. Accounting ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn long_round_trip_books_price_move(
        stake in arb_stake(),
        entry in arb_price(),
        exit in arb_price(),
    ) {
        let size = FixedStakeSizer::new(stake).entry_size(entry);
        let mut portfolio = Portfolio::new("SPY", stake);
        portfolio.execute_order(TradeAction::Buy, entry, size);
        portfolio.execute_order(TradeAction::Sell, exit, size);
        prop_assert_eq!(portfolio.position().size, 0);
        let expected = stake + size as f64 * (exit - entry);
        prop_assert!((portfolio.cash() - expected).abs() < 1e-6);
    }

    #[test]
    fn short_round_trip_books_price_move(
        stake in arb_stake(),
        entry in arb_price(),
        exit in arb_price(),
    ) {
        let size = FixedStakeSizer::new(stake).entry_size(entry);
        let mut portfolio = Portfolio::new("SPY", stake);
        portfolio.execute_order(TradeAction::SellShort, entry, size);
        // Marked at the entry price, the book is worth exactly the stake.
        prop_assert!((portfolio.value(entry) - stake).abs() < 1e-6);
        portfolio.execute_order(TradeAction::BuyToCover, exit, size);
        prop_assert_eq!(portfolio.position().size, 0);
        let expected = stake + size as f64 * (entry - exit);
        prop_assert!((portfolio.cash() - expected).abs() < 1e-6);
    }
}

// ── 3. Counter ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn days_met_grows_by_one_or_resets(
        bars in arb_bars(60),
        readings in prop::collection::vec(arb_reading(), 60),
        short in any::<bool>(),
    ) {
        let direction = if short { Direction::Short } else { Direction::Long };
        let params = StrategyParams::default();
        let mut machine = StrategyMachine::new(direction, params);

        for (bar, reading) in bars.iter().zip(readings) {
            let before = machine.state();
            machine.on_bar(bar, reading);
            let after = machine.state();

            match reading.map(|r| direction.classify(r, &params)) {
                Some(Zone::Confirming) => prop_assert_eq!(after.days_met, before.days_met + 1),
                Some(Zone::Opposing) => {
                    prop_assert_eq!(after.days_met, 0);
                    prop_assert!(!after.in_market);
                }
                Some(Zone::Neutral) | None => prop_assert_eq!(after, before),
            }
        }
    }
}

// ── 4. Single open position ──────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn entries_and_exits_alternate(bars in arb_bars(200), stake in arb_stake()) {
        let config = EngineConfig {
            stochastic: StochasticConfig::new(5, 2, 3),
            ..EngineConfig::new(stake)
        };
        let mut ledger = TradeLedger::new();
        let run = run_symbol("SPY", &bars, &config, &mut ledger).unwrap();

        for book in [
            [TradeAction::Buy, TradeAction::Sell],
            [TradeAction::SellShort, TradeAction::BuyToCover],
        ] {
            let trades: Vec<_> = ledger
                .records()
                .iter()
                .filter(|r| book.contains(&r.action))
                .collect();
            for (i, trade) in trades.iter().enumerate() {
                prop_assert_eq!(trade.action, book[i % 2]);
                if i % 2 == 1 {
                    prop_assert_eq!(trade.size, trades[i - 1].size);
                    prop_assert!(trade.date > trades[i - 1].date);
                }
            }
        }

        prop_assert!(run.long.final_position >= 0);
        prop_assert!(run.short.final_position <= 0);
        prop_assert_eq!(run.long.equity_curve.len(), bars.len());
    }
}
