//! Core domain types and logic.

pub mod ohlcv;
pub mod candle_store;
pub mod indicator;
pub mod pivot;
pub mod structure;
pub mod fib;
pub mod signal;
pub mod strategy;
pub mod sizing;
pub mod trade;
pub mod backtest;
pub mod metrics;
pub mod replay;
pub mod config_validation;
pub mod error;
