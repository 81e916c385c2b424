//! StochLab Core: engine, domain types, indicator, patterns, sizing, data.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, positions, portfolios, trade records)
//! - Slow stochastic indicator with streaming state
//! - Two-bar engulfing pattern detection
//! - Direction-parametrized entry/exit state machine
//! - Fixed-stake position sizing
//! - Bar-by-bar loop running independent long and short books
//! - Data provider trait with Yahoo, CSV, in-memory and synthetic sources

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod ledger;
pub mod patterns;
pub mod sizers;
pub mod strategy;
