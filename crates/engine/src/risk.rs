//! Stop-loss and take-profit levels for long setups.

use crypto_signal_core::{RiskConfig, RiskLevels};
use std::collections::HashMap;

/// ATR multiple used for the stop when an instrument has no override.
pub const DEFAULT_STOP_MULTIPLIER: f64 = 2.0;

/// Per-instrument stop multipliers with a fallback default.
///
/// Lookups are exact matches on the instrument identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskTable {
    default_multiplier: f64,
    overrides: HashMap<String, f64>,
}

impl Default for RiskTable {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_MULTIPLIER).with_override("BTC/USDT", 1.5)
    }
}

impl RiskTable {
    #[must_use]
    pub fn new(default_multiplier: f64) -> Self {
        Self {
            default_multiplier,
            overrides: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_override(mut self, symbol: impl Into<String>, multiplier: f64) -> Self {
        self.overrides.insert(symbol.into(), multiplier);
        self
    }

    #[must_use]
    pub fn multiplier(&self, symbol: &str) -> f64 {
        self.overrides
            .get(symbol)
            .copied()
            .unwrap_or(self.default_multiplier)
    }
}

/// Converts an entry price and a volatility value into staged exit levels.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskCalculator {
    pub stop_multipliers: RiskTable,
    /// Take-profit distances in units of the stop distance (R-multiples)
    pub reward_multiples: [f64; 3],
}

impl Default for RiskCalculator {
    fn default() -> Self {
        Self {
            stop_multipliers: RiskTable::default(),
            reward_multiples: [1.5, 2.5, 4.0],
        }
    }
}

impl From<&RiskConfig> for RiskCalculator {
    fn from(config: &RiskConfig) -> Self {
        let stop_multipliers = config.stop_multipliers.iter().fold(
            RiskTable::new(config.default_stop_multiplier),
            |table, (symbol, multiplier)| table.with_override(symbol.clone(), *multiplier),
        );
        Self {
            stop_multipliers,
            reward_multiples: config.reward_multiples,
        }
    }
}

impl RiskCalculator {
    /// Long-side levels: stop below entry by `multiplier * volatility`,
    /// targets above entry at the configured R-multiples.
    #[must_use]
    pub fn levels(&self, symbol: &str, entry: f64, volatility: f64) -> RiskLevels {
        let stop_loss = entry - self.stop_multipliers.multiplier(symbol) * volatility;
        let distance = entry - stop_loss;
        let [r1, r2, r3] = self.reward_multiples;

        RiskLevels {
            entry,
            stop_loss,
            tp1: entry + distance * r1,
            tp2: entry + distance * r2,
            tp3: entry + distance * r3,
            risk_pct: distance / entry * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn btc_uses_tighter_stop() {
        let levels = RiskCalculator::default().levels("BTC/USDT", 50_000.0, 1_000.0);

        assert!(approx(levels.entry, 50_000.0));
        assert!(approx(levels.stop_loss, 48_500.0));
        assert!(approx(levels.tp1, 52_250.0));
        assert!(approx(levels.tp2, 53_750.0));
        assert!(approx(levels.tp3, 56_000.0));
        assert!(approx(levels.risk_pct, 3.0));
    }

    #[test]
    fn other_instruments_use_default_multiplier() {
        let levels = RiskCalculator::default().levels("ETH/USDT", 50_000.0, 1_000.0);

        assert!(approx(levels.stop_loss, 48_000.0));
        assert!(approx(levels.tp1, 53_000.0));
        assert!(approx(levels.tp3, 58_000.0));
        assert!(approx(levels.risk_pct, 4.0));
    }

    #[test]
    fn lookup_is_exact_not_substring() {
        let table = RiskTable::default();
        assert!(approx(table.multiplier("BTC/USDT"), 1.5));
        assert!(approx(table.multiplier("WBTC/USDT"), 2.0));
        assert!(approx(table.multiplier("BTC/EUR"), 2.0));
    }

    #[test]
    fn builds_from_config_overrides() {
        let mut config = RiskConfig::default();
        config.default_stop_multiplier = 2.5;
        config.stop_multipliers.insert("SOL/USDT".to_string(), 3.0);
        config.reward_multiples = [1.0, 2.0, 3.0];

        let calculator = RiskCalculator::from(&config);

        assert!(approx(calculator.stop_multipliers.multiplier("SOL/USDT"), 3.0));
        assert!(approx(calculator.stop_multipliers.multiplier("BTC/USDT"), 1.5));
        assert!(approx(calculator.stop_multipliers.multiplier("XRP/USDT"), 2.5));

        let levels = calculator.levels("SOL/USDT", 100.0, 2.0);
        assert!(approx(levels.stop_loss, 94.0));
        assert!(approx(levels.tp1, 106.0));
        assert!(approx(levels.tp2, 112.0));
        assert!(approx(levels.tp3, 118.0));
    }

    #[test]
    fn levels_are_ordered_for_positive_volatility() {
        let levels = RiskCalculator::default().levels("SOL/USDT", 150.0, 3.2);
        assert!(levels.stop_loss < levels.entry);
        assert!(levels.entry < levels.tp1);
        assert!(levels.tp1 < levels.tp2);
        assert!(levels.tp2 < levels.tp3);
        assert!(levels.risk_pct > 0.0);
    }
}
