use thiserror::Error;

/// Errors raised while parsing or validating configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid interval: '{0}'. Valid values: 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 6h, 8h, 12h, 1d, 3d, 1w, 1M")]
    InvalidInterval(String),

    #[error("scanner.symbols must contain at least one instrument")]
    NoSymbols,

    #[error("scanner.symbols contains a blank entry")]
    BlankSymbol,

    #[error("scanner.symbols lists {0} more than once")]
    DuplicateSymbol(String),

    #[error("scanner.candle_limit must be at least {min}, got {actual}")]
    CandleLimitTooSmall { min: usize, actual: usize },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field} is too large: {value}")]
    DurationOutOfRange { field: &'static str, value: u64 },

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidMultiplier { field: String, value: f64 },

    #[error("telegram.{0} is required")]
    MissingCredential(&'static str),
}
