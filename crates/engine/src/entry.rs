//! EMA bounce entry detector.
//!
//! Looks for a lower-timeframe candle that dipped to or through its EMA50 and
//! closed back above it with a bullish body. A quality score gates emission
//! and sets confidence.

use crate::error::AnalysisError;
use crate::indicators::{ema, sma};
use crypto_signal_core::{closes, volumes, Candle, Confidence, Direction, EntryCandidate, TrendLabel};

pub const EMA_BOUNCE: &str = "EMA Bounce";

/// Configuration for bounce detection and scoring.
#[derive(Debug, Clone)]
pub struct EntryConfig {
    pub ema_span: usize,
    /// Window for the average volume
    pub volume_period: usize,
    /// Latest volume must exceed average volume times this
    pub volume_multiplier: f64,
    /// Minimum quality to emit a candidate
    pub min_quality: u8,
    /// Quality at or above which confidence is High
    pub high_confidence_quality: u8,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            ema_span: 50,
            volume_period: 20,
            volume_multiplier: 1.2,
            min_quality: 3,
            high_confidence_quality: 4,
        }
    }
}

/// Inputs to the bounce test and quality score, all taken at the latest candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceSnapshot {
    pub candle: Candle,
    pub ema: f64,
    /// `None` when fewer candles than the volume window exist
    pub average_volume: Option<f64>,
}

impl BounceSnapshot {
    /// Low touched the EMA, close finished above it, and the body is bullish.
    #[must_use]
    pub fn is_bounce(&self) -> bool {
        self.candle.low <= self.ema && self.candle.close > self.ema && self.candle.is_bullish()
    }
}

impl EntryConfig {
    /// Scans the latest lower-timeframe candle for an EMA bounce.
    ///
    /// Returns `Ok(None)` when there is no setup.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientHistory` for an empty series.
    pub fn detect(
        &self,
        candles: &[Candle],
        trend: TrendLabel,
    ) -> Result<Option<EntryCandidate>, AnalysisError> {
        let snapshot = self.snapshot(candles)?;
        Ok(self.evaluate(&snapshot, trend))
    }

    /// Computes the latest-candle inputs for the bounce test.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientHistory` for an empty series.
    pub fn snapshot(&self, candles: &[Candle]) -> Result<BounceSnapshot, AnalysisError> {
        let candle = *candles.last().ok_or(AnalysisError::InsufficientHistory {
            indicator: "entry EMA",
            needed: 1,
            available: 0,
        })?;
        // Non-empty input always yields a last EMA value
        let ema = ema(&closes(candles), self.ema_span)
            .last()
            .copied()
            .unwrap_or(candle.close);
        let average_volume = sma(&volumes(candles), self.volume_period)
            .last()
            .copied()
            .flatten();

        Ok(BounceSnapshot {
            candle,
            ema,
            average_volume,
        })
    }

    /// Quality score: +2 bullish trend, +1 close above EMA, +1 volume surge.
    ///
    /// The close-above-EMA point overlaps the bounce test and is scored anyway.
    #[must_use]
    pub fn quality(&self, snapshot: &BounceSnapshot, trend: TrendLabel) -> u8 {
        let mut quality = 0;
        if trend.is_bullish() {
            quality += 2;
        }
        if snapshot.candle.close > snapshot.ema {
            quality += 1;
        }
        if snapshot
            .average_volume
            .is_some_and(|avg| snapshot.candle.volume > avg * self.volume_multiplier)
        {
            quality += 1;
        }
        quality
    }

    /// Emits a candidate only for a bounce in a bullish trend with enough quality.
    #[must_use]
    pub fn evaluate(&self, snapshot: &BounceSnapshot, trend: TrendLabel) -> Option<EntryCandidate> {
        let quality = self.quality(snapshot, trend);
        if !(snapshot.is_bounce() && trend.is_bullish() && quality >= self.min_quality) {
            return None;
        }

        let confidence = if quality >= self.high_confidence_quality {
            Confidence::High
        } else {
            Confidence::Medium
        };

        Some(EntryCandidate {
            direction: Direction::Long,
            pattern: EMA_BOUNCE.to_string(),
            quality,
            confidence,
        })
    }
}
