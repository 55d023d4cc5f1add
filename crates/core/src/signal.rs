//! Signal record types produced by the detection engine.
//!
//! Every type here is a plain value: derived once per scan, handed to the
//! notifier, then dropped. Nothing in this module holds state between scans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade setup.
///
/// The engine is long-only; there is no short-side counterpart yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.write_str("LONG"),
        }
    }
}

/// Volatility regime.
///
/// The state mirrors `RegimeAssessment::trading_allowed`; it is a label for
/// the same decision, not a second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeState {
    /// Short-horizon volatility expanded and no exhaustion run-up: tradable.
    Expansion,
    /// Anything else.
    Contraction,
}

impl RegimeState {
    #[must_use]
    pub const fn from_trading_allowed(trading_allowed: bool) -> Self {
        if trading_allowed {
            Self::Expansion
        } else {
            Self::Contraction
        }
    }
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expansion => f.write_str("EXPANSION"),
            Self::Contraction => f.write_str("CONTRACTION"),
        }
    }
}

/// Lower-timeframe volatility classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub state: RegimeState,
    /// Short ATR divided by long ATR
    pub atr_ratio: f64,
    /// Latest short-window ATR; also the volatility input for risk levels
    pub atr_short: f64,
    /// Latest long-window ATR
    pub atr_long: f64,
    /// Percentage close-to-close change over the momentum lookback
    pub gain_3d_pct: f64,
    pub trading_allowed: bool,
}

/// Higher-timeframe trend label.
///
/// Only bullish alignment is recognised in this version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    Bullish,
    Neutral,
}

impl TrendLabel {
    /// Bullish iff `close > ema_fast > ema_slow`, both inequalities strict.
    #[must_use]
    pub fn from_levels(close: f64, ema_fast: f64, ema_slow: f64) -> Self {
        if close > ema_fast && ema_fast > ema_slow {
            Self::Bullish
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn is_bullish(self) -> bool {
        matches!(self, Self::Bullish)
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => f.write_str("BULLISH"),
            Self::Neutral => f.write_str("NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH"),
            Self::Medium => f.write_str("MEDIUM"),
        }
    }
}

/// A detected entry setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCandidate {
    pub direction: Direction,
    pub pattern: String,
    /// Quality score; the scorer currently tops out at 4
    pub quality: u8,
    pub confidence: Confidence,
}

/// Stop-loss and staged take-profit levels for a long entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    /// Distance from entry to stop as a percentage of entry
    pub risk_pct: f64,
}

/// A complete trade-setup notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    pub entry: EntryCandidate,
    pub regime: RegimeAssessment,
    pub htf_trend: TrendLabel,
    pub levels: RiskLevels,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_bullish_on_strict_alignment() {
        assert_eq!(TrendLabel::from_levels(110.0, 105.0, 100.0), TrendLabel::Bullish);
    }

    #[test]
    fn trend_neutral_when_close_below_fast() {
        assert_eq!(TrendLabel::from_levels(95.0, 105.0, 100.0), TrendLabel::Neutral);
    }

    #[test]
    fn trend_neutral_on_ties() {
        assert_eq!(TrendLabel::from_levels(105.0, 105.0, 100.0), TrendLabel::Neutral);
        assert_eq!(TrendLabel::from_levels(110.0, 100.0, 100.0), TrendLabel::Neutral);
    }

    #[test]
    fn trend_neutral_when_fast_below_slow() {
        assert_eq!(TrendLabel::from_levels(110.0, 100.0, 105.0), TrendLabel::Neutral);
    }

    #[test]
    fn regime_state_follows_trading_allowed() {
        assert_eq!(RegimeState::from_trading_allowed(true), RegimeState::Expansion);
        assert_eq!(RegimeState::from_trading_allowed(false), RegimeState::Contraction);
    }

    #[test]
    fn labels_render_upper_case() {
        assert_eq!(Direction::Long.to_string(), "LONG");
        assert_eq!(RegimeState::Expansion.to_string(), "EXPANSION");
        assert_eq!(TrendLabel::Neutral.to_string(), "NEUTRAL");
        assert_eq!(Confidence::Medium.to_string(), "MEDIUM");
    }
}
