use serde::{Deserialize, Serialize};

/// Signed share position in one symbol: positive is long, negative is short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub size: i64,
}

impl Position {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            size: 0,
        }
    }

    pub fn is_long(&self) -> bool {
        self.size > 0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.size as f64 * current_price
    }
}
