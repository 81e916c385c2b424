//! Domain types for StochLab

pub mod bar;
pub mod portfolio;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use portfolio::Portfolio;
pub use position::Position;
pub use trade::{TradeAction, TradeRecord};
