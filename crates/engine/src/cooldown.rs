//! Per-instrument signal cooldown.
//!
//! The map lives only in memory; a restart forgets every cooldown.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CooldownTracker {
    cooldown: Duration,
    last_signals: HashMap<String, DateTime<Utc>>,
}

impl CooldownTracker {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_signals: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time left before `symbol` may signal again, or `None` if it is free.
    ///
    /// A symbol frees up once the elapsed time reaches the cooldown.
    #[must_use]
    pub fn remaining(&self, symbol: &str, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_signals.get(symbol)?;
        let elapsed = now - *last;
        if elapsed < self.cooldown {
            Some(self.cooldown - elapsed)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_cooling_down(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        self.remaining(symbol, now).is_some()
    }

    /// Stamps `at` as the latest signal time for `symbol`.
    pub fn record(&mut self, symbol: &str, at: DateTime<Utc>) {
        self.last_signals.insert(symbol.to_string(), at);
    }

    #[must_use]
    pub fn last_signal(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_signals.get(symbol).copied()
    }
}
