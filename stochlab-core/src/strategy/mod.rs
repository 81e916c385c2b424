//! Stochastic/engulfing strategy state machine.
//!
//! One machine serves both books. A [`Direction`] supplies the polarity:
//! which side of %D counts as confirmation, which engulfing pattern
//! triggers entry, and which action pair opens and closes the position.

pub mod direction;
pub mod machine;

pub use direction::{Direction, Zone};
pub use machine::{Signal, SignalState, StrategyMachine, StrategyParams};
