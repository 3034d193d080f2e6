//! Indicators computed over candle closes.

pub mod sma;
