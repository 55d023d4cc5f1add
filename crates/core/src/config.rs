use crate::candle::Interval;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Minimum candles per fetch; the long ATR window and EMA200 need this much history.
pub const MIN_CANDLE_LIMIT: usize = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub risk: RiskConfig,
    pub exchange: ExchangeConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Instrument identifiers in "BASE/QUOTE" form
    pub symbols: Vec<String>,
    /// Trend-context timeframe
    pub higher_timeframe: Interval,
    /// Entry-timing timeframe
    pub lower_timeframe: Interval,
    pub candle_limit: usize,
    pub scan_interval_secs: u64,
    pub signal_cooldown_secs: u64,
    /// Pause after each signal send attempt, for the notifier's rate limits
    pub notify_pause_secs: u64,
    pub send_pass_summary: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                "BTC/USDT".to_string(),
                "ETH/USDT".to_string(),
                "SOL/USDT".to_string(),
            ],
            higher_timeframe: Interval::FourHours,
            lower_timeframe: Interval::OneHour,
            candle_limit: MIN_CANDLE_LIMIT,
            scan_interval_secs: 300,
            signal_cooldown_secs: 3600,
            notify_pause_secs: 2,
            send_pass_summary: false,
        }
    }
}

impl ScannerConfig {
    #[must_use]
    pub const fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    #[must_use]
    pub const fn notify_pause(&self) -> Duration {
        Duration::from_secs(self.notify_pause_secs)
    }

    /// Cooldown as a chrono duration.
    ///
    /// # Errors
    ///
    /// Returns `DurationOutOfRange` when the seconds do not fit a `chrono::Duration`.
    pub fn signal_cooldown(&self) -> Result<chrono::Duration, ConfigError> {
        i64::try_from(self.signal_cooldown_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or(ConfigError::DurationOutOfRange {
                field: "scanner.signal_cooldown_secs",
                value: self.signal_cooldown_secs,
            })
    }
}

/// Per-instrument stop multipliers and reward multiples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// ATR multiple for the stop when no override exists
    pub default_stop_multiplier: f64,
    /// Exact-match overrides keyed by instrument identifier
    pub stop_multipliers: BTreeMap<String, f64>,
    /// Take-profit distances as multiples of the stop distance (tp1, tp2, tp3)
    pub reward_multiples: [f64; 3],
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_stop_multiplier: 2.0,
            stop_multipliers: BTreeMap::from([("BTC/USDT".to_string(), 1.5)]),
            reward_multiples: [1.5, 2.5, 4.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub api_url: String,
    pub rate_limit_per_second: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.binance.com".to_string(),
            rate_limit_per_second: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

impl AppConfig {
    /// Checks the settings the scanner depends on.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scanner = &self.scanner;
        if scanner.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        let mut seen = HashSet::new();
        for symbol in &scanner.symbols {
            if symbol.trim().is_empty() {
                return Err(ConfigError::BlankSymbol);
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }
        if scanner.candle_limit < MIN_CANDLE_LIMIT {
            return Err(ConfigError::CandleLimitTooSmall {
                min: MIN_CANDLE_LIMIT,
                actual: scanner.candle_limit,
            });
        }
        if scanner.scan_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "scanner.scan_interval_secs",
            });
        }
        if scanner.signal_cooldown_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "scanner.signal_cooldown_secs",
            });
        }
        scanner.signal_cooldown()?;
        if self.exchange.rate_limit_per_second == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "exchange.rate_limit_per_second",
            });
        }

        check_multiplier("risk.default_stop_multiplier", self.risk.default_stop_multiplier)?;
        for (symbol, value) in &self.risk.stop_multipliers {
            check_multiplier(&format!("risk.stop_multipliers.{symbol}"), *value)?;
        }
        for (i, value) in self.risk.reward_multiples.iter().enumerate() {
            check_multiplier(&format!("risk.reward_multiples[{i}]"), *value)?;
        }

        Ok(())
    }

    /// Validates that notifier credentials are present.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing field.
    pub fn validate_telegram(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingCredential("bot_token"));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("chat_id"));
        }
        Ok(())
    }

    /// Copy with secrets masked, for printing.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.telegram.bot_token.is_empty() {
            copy.telegram.bot_token = "***".to_string();
        }
        copy
    }
}

fn check_multiplier(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMultiplier {
            field: field.to_string(),
            value,
        })
    }
}
