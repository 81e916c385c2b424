//! Portfolio: simulated brokerage account for one (symbol, direction) book.

use super::position::Position;
use super::trade::TradeAction;

/// Cash plus a single signed position.
///
/// Each strategy direction runs against its own `Portfolio`; long and short
/// books for the same symbol never share cash or shares. Orders fill
/// immediately and in full at the given price, with no commission or
/// slippage. The accounting identity `value == cash + size * price` holds
/// after every order.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    initial_cash: f64,
    position: Position,
}

impl Portfolio {
    pub fn new(symbol: impl Into<String>, initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            position: Position::flat(symbol),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Fill an order in full at `price`.
    ///
    /// Buy/BuyToCover add `size` shares and pay `size * price`;
    /// Sell/SellShort remove `size` shares and receive `size * price`.
    pub fn execute_order(&mut self, action: TradeAction, price: f64, size: u64) {
        let delta = action.sign() * size as i64;
        self.position.size += delta;
        self.cash -= delta as f64 * price;
    }

    /// Mark-to-market value at `last_close`.
    pub fn value(&self, last_close: f64) -> f64 {
        self.cash + self.position.market_value(last_close)
    }

    /// Profit or loss versus the starting cash, marked at `last_close`.
    pub fn pnl(&self, last_close: f64) -> f64 {
        self.value(last_close) - self.initial_cash
    }
}
