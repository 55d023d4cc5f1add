//! Volatility regime classifier.
//!
//! Trading is permitted only when short-horizon volatility has expanded well
//! above its long-horizon baseline, and suppressed right after a large
//! run-up (blow-off filter).

use crate::error::AnalysisError;
use crate::indicators::latest_atr;
use crypto_signal_core::{Candle, RegimeAssessment, RegimeState};

/// Configuration for regime classification.
#[derive(Debug, Clone)]
pub struct RegimeConfig {
    /// Short ATR window
    pub short_atr_period: usize,
    /// Long (baseline) ATR window
    pub long_atr_period: usize,
    /// Short/long ATR ratio that must be exceeded
    pub min_atr_ratio: f64,
    /// Candles back to the momentum reference close (72 x 1h = 3 days)
    pub momentum_lookback: usize,
    /// Gain above which entries are suppressed, in percent
    pub max_gain_pct: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            short_atr_period: 14,
            long_atr_period: 100,
            min_atr_ratio: 1.3,
            momentum_lookback: 72,
            max_gain_pct: 30.0,
        }
    }
}

impl RegimeConfig {
    /// The trading decision on its own: expanded volatility and no blow-off.
    #[must_use]
    pub fn permits(&self, atr_ratio: f64, gain_pct: f64) -> bool {
        atr_ratio > self.min_atr_ratio && !(gain_pct > self.max_gain_pct)
    }

    /// Classifies the regime of a lower-timeframe series.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientHistory` when either ATR window cannot be filled,
    /// and `DegenerateVolatility` when the long ATR is zero. Callers treat
    /// both as "regime indeterminate", never as tradable.
    pub fn classify(&self, candles: &[Candle]) -> Result<RegimeAssessment, AnalysisError> {
        let atr_short = latest_atr(candles, self.short_atr_period).ok_or(
            AnalysisError::InsufficientHistory {
                indicator: "short ATR",
                needed: self.short_atr_period + 1,
                available: candles.len(),
            },
        )?;
        let atr_long = latest_atr(candles, self.long_atr_period).ok_or(
            AnalysisError::InsufficientHistory {
                indicator: "long ATR",
                needed: self.long_atr_period + 1,
                available: candles.len(),
            },
        )?;

        let atr_ratio = atr_short / atr_long;
        if atr_long == 0.0 || !atr_ratio.is_finite() {
            return Err(AnalysisError::DegenerateVolatility {
                atr_short,
                atr_long,
            });
        }

        let gain_3d_pct = self.gain_pct(candles);
        let trading_allowed = self.permits(atr_ratio, gain_3d_pct);

        Ok(RegimeAssessment {
            state: RegimeState::from_trading_allowed(trading_allowed),
            atr_ratio,
            atr_short,
            atr_long,
            gain_3d_pct,
            trading_allowed,
        })
    }

    /// Percentage change from the reference close `momentum_lookback` positions
    /// from the end to the latest close. Zero without enough history.
    #[must_use]
    pub fn gain_pct(&self, candles: &[Candle]) -> f64 {
        if self.momentum_lookback == 0 || candles.len() <= self.momentum_lookback {
            return 0.0;
        }
        let reference = candles[candles.len() - self.momentum_lookback].close;
        let latest = candles[candles.len() - 1].close;
        if reference == 0.0 {
            return 0.0;
        }
        (latest - reference) / reference * 100.0
    }
}
