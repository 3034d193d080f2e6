//! Port traits at the edges of the domain.

pub mod candle_source;
pub mod config_port;
pub mod report_port;
