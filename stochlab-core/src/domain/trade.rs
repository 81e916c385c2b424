//! TradeRecord: one executed order, as written to the trade ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four order actions the strategies emit.
///
/// Serialized labels match the ledger file (`Buy`, `Sell`, `Sell Short`,
/// `Buy to Cover`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    #[serde(rename = "Sell Short")]
    SellShort,
    #[serde(rename = "Buy to Cover")]
    BuyToCover,
}

impl TradeAction {
    /// +1 for actions that add shares (Buy, BuyToCover), -1 for those that remove them.
    pub fn sign(self) -> i64 {
        match self {
            Self::Buy | Self::BuyToCover => 1,
            Self::Sell | Self::SellShort => -1,
        }
    }

    /// Whether this action opens a position.
    pub fn is_entry(self) -> bool {
        matches!(self, Self::Buy | Self::SellShort)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::SellShort => "Sell Short",
            Self::BuyToCover => "Buy to Cover",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An executed order. Field order matches the ledger columns
/// `date, stock, action, price, size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    #[serde(rename = "stock")]
    pub symbol: String,
    pub action: TradeAction,
    pub price: f64,
    pub size: u64,
}

impl TradeRecord {
    /// Cash value of the order (price * size).
    pub fn notional(&self) -> f64 {
        self.price * self.size as f64
    }
}
