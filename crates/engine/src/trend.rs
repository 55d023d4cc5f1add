//! Higher-timeframe trend classifier.

use crate::error::AnalysisError;
use crate::indicators::latest_ema;
use crypto_signal_core::{closes, Candle, TrendLabel};

#[derive(Debug, Clone)]
pub struct TrendConfig {
    pub fast_span: usize,
    pub slow_span: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            fast_span: 50,
            slow_span: 200,
        }
    }
}

impl TrendConfig {
    /// Labels the series Bullish when `close > EMA(fast) > EMA(slow)` on the
    /// latest candle. Both EMAs warm up over the whole series.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientHistory` for an empty series.
    pub fn classify(&self, candles: &[Candle]) -> Result<TrendLabel, AnalysisError> {
        let closes = closes(candles);
        let insufficient = || AnalysisError::InsufficientHistory {
            indicator: "trend EMA",
            needed: 1,
            available: 0,
        };

        let close = closes.last().copied().ok_or_else(insufficient)?;
        let fast = latest_ema(&closes, self.fast_span).ok_or_else(insufficient)?;
        let slow = latest_ema(&closes, self.slow_span).ok_or_else(insufficient)?;

        Ok(TrendLabel::from_levels(close, fast, slow))
    }
}
