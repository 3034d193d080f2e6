//! Domain error types.
//!
//! Only malformed configuration and I/O at the edges are errors. Too little
//! history, degenerate swings and unknown strategies surface as `None`.

/// Top-level error type for zonetrader.
#[derive(Debug, thiserror::Error)]
pub enum ZonetraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} ({timeframe})")]
    NoData { symbol: String, timeframe: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ZonetraderError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ZonetraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        ZonetraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&ZonetraderError> for std::process::ExitCode {
    fn from(err: &ZonetraderError) -> Self {
        let code: u8 = match err {
            ZonetraderError::Io(_) | ZonetraderError::Report { .. } => 1,
            ZonetraderError::ConfigParse { .. }
            | ZonetraderError::ConfigMissing { .. }
            | ZonetraderError::ConfigInvalid { .. } => 2,
            ZonetraderError::Data { .. } => 3,
            ZonetraderError::NoData { .. } | ZonetraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_message() {
        let err = ZonetraderError::invalid("backtest", "risk_pct", "must be in (0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] risk_pct: must be in (0, 1]"
        );
    }

    #[test]
    fn config_missing_message() {
        let err = ZonetraderError::missing("backtest", "account_size");
        assert_eq!(err.to_string(), "missing config key [backtest] account_size");
    }

    #[test]
    fn insufficient_data_message() {
        let err = ZonetraderError::InsufficientData {
            symbol: "BTC/USDT".into(),
            bars: 20,
            minimum: 51,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for BTC/USDT: have 20 bars, need 51"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ZonetraderError = io.into();
        assert!(matches!(err, ZonetraderError::Io(_)));
    }
}
