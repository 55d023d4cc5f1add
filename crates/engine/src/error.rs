use crypto_signal_core::Interval;
use thiserror::Error;

/// Failures inside a classifier or detector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Not enough candles for the requested lookback.
    #[error("{indicator} needs at least {needed} candles, got {available}")]
    InsufficientHistory {
        indicator: &'static str,
        needed: usize,
        available: usize,
    },

    /// The long-window ATR is zero (or the ratio is otherwise not finite),
    /// so the volatility regime cannot be determined.
    #[error("regime indeterminate: long ATR {atr_long}, short ATR {atr_short}")]
    DegenerateVolatility { atr_short: f64, atr_long: f64 },
}

/// Why a single instrument's scan produced no result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    /// The provider could not return a candle series.
    #[error("no {interval} candles for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        interval: Interval,
        reason: String,
    },

    /// A classifier failed on data that was fetched successfully.
    #[error("analysis failed for {symbol}: {source}")]
    Analysis {
        symbol: String,
        #[source]
        source: AnalysisError,
    },
}
