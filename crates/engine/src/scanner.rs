//! One scan pass over the configured instruments.

use crate::formatter::SignalFormatter;
use crate::orchestrator::{ScanOutcome, SignalEngine};
use chrono::{DateTime, Utc};
use crypto_signal_core::{Clock, MarketDataProvider, MessageFormat, Notifier};
use std::time::Duration;
use tracing::{error, info};

/// Per-instrument outcome plus delivery status.
#[derive(Debug, Clone)]
pub struct InstrumentReport {
    pub symbol: String,
    pub outcome: ScanOutcome,
    /// `Some(true)` if a signal was delivered, `Some(false)` if delivery failed,
    /// `None` when there was nothing to send.
    pub delivered: Option<bool>,
}

/// Summary of one pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reports: Vec<InstrumentReport>,
}

impl PassSummary {
    #[must_use]
    pub fn signals(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.signal().is_some())
            .count()
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failure()).count()
    }

    #[must_use]
    pub fn on_cooldown(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, ScanOutcome::OnCooldown { .. }))
            .count()
    }

    #[must_use]
    pub fn delivery_failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.delivered == Some(false))
            .count()
    }

    #[must_use]
    pub fn report(&self, symbol: &str) -> Option<&InstrumentReport> {
        self.reports.iter().find(|r| r.symbol == symbol)
    }
}

/// Drives a `SignalEngine` over a list of instruments, one at a time.
pub struct Scanner<P, N, C>
where
    P: MarketDataProvider,
    N: Notifier,
    C: Clock,
{
    engine: SignalEngine<C>,
    provider: P,
    notifier: N,
    symbols: Vec<String>,
    notify_pause: Duration,
    formatter: SignalFormatter,
}

impl<P, N, C> Scanner<P, N, C>
where
    P: MarketDataProvider,
    N: Notifier,
    C: Clock,
{
    pub fn new(engine: SignalEngine<C>, provider: P, notifier: N, symbols: Vec<String>) -> Self {
        Self {
            engine,
            provider,
            notifier,
            symbols,
            notify_pause: Duration::from_secs(2),
            formatter: SignalFormatter,
        }
    }

    /// Pause after each signal send attempt, delivered or not.
    #[must_use]
    pub const fn with_notify_pause(mut self, pause: Duration) -> Self {
        self.notify_pause = pause;
        self
    }

    #[must_use]
    pub const fn engine(&self) -> &SignalEngine<C> {
        &self.engine
    }

    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Scans every instrument in order and delivers any signals.
    ///
    /// Infallible: failures are recorded in the summary.
    pub async fn scan_pass(&mut self) -> PassSummary {
        let started_at = self.engine.clock().now();
        info!(symbols = self.symbols.len(), "Scan pass started");

        let mut reports = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let outcome = self.engine.scan_symbol(&self.provider, symbol).await;

            let delivered = match outcome.signal() {
                Some(record) => {
                    let text = self.formatter.format_signal(record);
                    let ok = match self.notifier.send_message(&text, MessageFormat::Markdown).await {
                        Ok(()) => {
                            info!(symbol = %symbol, "Signal sent");
                            true
                        }
                        Err(e) => {
                            error!(symbol = %symbol, error = %e, "Failed to send signal");
                            false
                        }
                    };
                    tokio::time::sleep(self.notify_pause).await;
                    Some(ok)
                }
                None => None,
            };

            reports.push(InstrumentReport {
                symbol: symbol.clone(),
                outcome,
                delivered,
            });
        }

        let summary = PassSummary {
            started_at,
            finished_at: self.engine.clock().now(),
            reports,
        };
        info!(
            signals = summary.signals(),
            failures = summary.failures(),
            on_cooldown = summary.on_cooldown(),
            "Scan pass finished"
        );
        summary
    }

    /// Sends a lifecycle message, logging rather than returning failures.
    pub async fn announce(&self, text: &str) -> bool {
        match self.notifier.send_message(text, MessageFormat::Markdown).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to send lifecycle message");
                false
            }
        }
    }

    /// Sends the startup announcement.
    pub async fn announce_startup(&self) -> bool {
        let text = self.formatter.format_startup(&self.symbols);
        self.announce(&text).await
    }

    /// Sends a pass summary.
    pub async fn announce_summary(&self, summary: &PassSummary) -> bool {
        let text = self.formatter.format_summary(summary);
        self.announce(&text).await
    }
}
