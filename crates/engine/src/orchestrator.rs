//! Per-instrument signal orchestration.
//!
//! `SignalEngine` sequences regime, trend, entry and risk for one instrument
//! at a time, enforcing the cooldown before any data is fetched. Every failure
//! is folded into a `ScanOutcome` so one instrument never aborts its siblings.

use crate::cooldown::CooldownTracker;
use crate::entry::EntryConfig;
use crate::error::{AnalysisError, ScanError};
use crate::regime::RegimeConfig;
use crate::risk::RiskCalculator;
use crate::trend::TrendConfig;
use chrono::Duration;
use crypto_signal_core::{
    AppConfig, Candle, Clock, EntryCandidate, Interval, MarketDataProvider, RegimeAssessment,
    RiskLevels, SignalRecord, TrendLabel,
};
use tracing::{debug, error, info, warn};

/// Everything the engine needs to evaluate an instrument.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub higher_timeframe: Interval,
    pub lower_timeframe: Interval,
    pub candle_limit: usize,
    pub regime: RegimeConfig,
    pub trend: TrendConfig,
    pub entry: EntryConfig,
    pub risk: RiskCalculator,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            higher_timeframe: Interval::FourHours,
            lower_timeframe: Interval::OneHour,
            candle_limit: 200,
            regime: RegimeConfig::default(),
            trend: TrendConfig::default(),
            entry: EntryConfig::default(),
            risk: RiskCalculator::default(),
        }
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            higher_timeframe: config.scanner.higher_timeframe,
            lower_timeframe: config.scanner.lower_timeframe,
            candle_limit: config.scanner.candle_limit,
            risk: RiskCalculator::from(&config.risk),
            ..Self::default()
        }
    }
}

/// Why a scan completed without a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum NoSetupReason {
    /// Regime could not be classified; treated as not tradable.
    IndeterminateRegime(AnalysisError),
    /// Regime classified but trading not allowed.
    RegimeBlocked(RegimeAssessment),
    /// Trading allowed but no entry pattern.
    NoEntry {
        regime: RegimeAssessment,
        trend: TrendLabel,
    },
}

/// Result of scanning one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Signal(SignalRecord),
    OnCooldown { remaining: Duration },
    NoSetup(NoSetupReason),
    Failed(ScanError),
}

impl ScanOutcome {
    #[must_use]
    pub const fn signal(&self) -> Option<&SignalRecord> {
        match self {
            Self::Signal(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Pure evaluation of one instrument's series, before cooldown bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Setup {
        entry: EntryCandidate,
        regime: RegimeAssessment,
        trend: TrendLabel,
        levels: RiskLevels,
    },
    NoSetup(NoSetupReason),
}

/// Signal orchestrator.
///
/// The cooldown map and clock are supplied by the caller, so tests can drive
/// the engine with a manual clock and inspect cooldown state.
pub struct SignalEngine<C: Clock> {
    config: EngineConfig,
    cooldowns: CooldownTracker,
    clock: C,
}

impl<C: Clock> SignalEngine<C> {
    #[must_use]
    pub const fn new(config: EngineConfig, cooldowns: CooldownTracker, clock: C) -> Self {
        Self {
            config,
            cooldowns,
            clock,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs regime, trend, entry and risk on already-fetched series.
    ///
    /// # Errors
    ///
    /// Returns an error if the trend or entry stage cannot run on the input.
    /// Regime failures are not errors here; they come back as
    /// `NoSetupReason::IndeterminateRegime`.
    pub fn evaluate(
        &self,
        symbol: &str,
        higher: &[Candle],
        lower: &[Candle],
    ) -> Result<Evaluation, AnalysisError> {
        let regime = match self.config.regime.classify(lower) {
            Ok(regime) => regime,
            Err(e) => {
                return Ok(Evaluation::NoSetup(NoSetupReason::IndeterminateRegime(e)));
            }
        };
        if !regime.trading_allowed {
            return Ok(Evaluation::NoSetup(NoSetupReason::RegimeBlocked(regime)));
        }

        let trend = self.config.trend.classify(higher)?;
        let Some(entry) = self.config.entry.detect(lower, trend)? else {
            return Ok(Evaluation::NoSetup(NoSetupReason::NoEntry { regime, trend }));
        };

        let entry_price = lower.last().map_or(0.0, |c| c.close);
        let levels = self
            .config
            .risk
            .levels(symbol, entry_price, regime.atr_short);

        debug!(symbol, quality = entry.quality, "Entry setup found");

        Ok(Evaluation::Setup {
            entry,
            regime,
            trend,
            levels,
        })
    }

    /// Scans one instrument end to end.
    ///
    /// Never fails: data and analysis errors are logged and returned as
    /// `ScanOutcome::Failed`.
    pub async fn scan_symbol<P>(&mut self, provider: &P, symbol: &str) -> ScanOutcome
    where
        P: MarketDataProvider + ?Sized,
    {
        if let Some(remaining) = self.cooldowns.remaining(symbol, self.clock.now()) {
            debug!(
                symbol,
                remaining_secs = remaining.num_seconds(),
                "Skipping, signal cooldown active"
            );
            return ScanOutcome::OnCooldown { remaining };
        }

        let higher = match self
            .fetch(provider, symbol, self.config.higher_timeframe)
            .await
        {
            Ok(candles) => candles,
            Err(e) => return ScanOutcome::Failed(e),
        };
        let lower = match self
            .fetch(provider, symbol, self.config.lower_timeframe)
            .await
        {
            Ok(candles) => candles,
            Err(e) => return ScanOutcome::Failed(e),
        };

        // Non-empty series always satisfy trend and entry today; this guards
        // classifiers with longer minimum histories.
        let evaluation = match self.evaluate(symbol, &higher, &lower) {
            Ok(evaluation) => evaluation,
            Err(source) => {
                error!(symbol, error = %source, "Signal analysis failed");
                return ScanOutcome::Failed(ScanError::Analysis {
                    symbol: symbol.to_string(),
                    source,
                });
            }
        };

        match evaluation {
            Evaluation::NoSetup(reason) => {
                match &reason {
                    NoSetupReason::IndeterminateRegime(e) => {
                        warn!(symbol, error = %e, "Regime indeterminate, not trading");
                    }
                    NoSetupReason::RegimeBlocked(regime) => {
                        debug!(
                            symbol,
                            atr_ratio = regime.atr_ratio,
                            gain_3d_pct = regime.gain_3d_pct,
                            "Regime does not allow trading"
                        );
                    }
                    NoSetupReason::NoEntry { trend, .. } => {
                        debug!(symbol, trend = %trend, "No entry setup");
                    }
                }
                ScanOutcome::NoSetup(reason)
            }
            Evaluation::Setup {
                entry,
                regime,
                trend,
                levels,
            } => {
                let now = self.clock.now();
                self.cooldowns.record(symbol, now);
                info!(
                    symbol,
                    quality = entry.quality,
                    confidence = %entry.confidence,
                    entry = levels.entry,
                    stop_loss = levels.stop_loss,
                    "Signal generated"
                );
                ScanOutcome::Signal(SignalRecord {
                    symbol: symbol.to_string(),
                    entry,
                    regime,
                    htf_trend: trend,
                    levels,
                    timestamp: now,
                })
            }
        }
    }

    async fn fetch<P>(
        &self,
        provider: &P,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, ScanError>
    where
        P: MarketDataProvider + ?Sized,
    {
        let unavailable = |reason: String| {
            warn!(symbol, interval = %interval, reason = %reason, "Candle data unavailable");
            ScanError::DataUnavailable {
                symbol: symbol.to_string(),
                interval,
                reason,
            }
        };

        match provider
            .fetch_candles(symbol, interval, self.config.candle_limit)
            .await
        {
            Ok(candles) if candles.is_empty() => Err(unavailable("empty candle series".to_string())),
            Ok(candles) => Ok(candles),
            Err(e) => Err(unavailable(format!("{e:#}"))),
        }
    }
}
