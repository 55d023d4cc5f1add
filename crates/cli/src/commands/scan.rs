//! One-shot scan pass.

use super::{build_scanner, load_config};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use crypto_signal_core::{MessageFormat, Notifier};
use crypto_signal_engine::{InstrumentReport, NoSetupReason, PassSummary, ScanOutcome};
use crypto_signal_telegram::TelegramNotifier;

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Print signal messages to stdout instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,
}

/// Notifier that writes messages to stdout.
struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send_message(&self, text: &str, _format: MessageFormat) -> Result<()> {
        println!("{text}\n");
        Ok(())
    }
}

/// Runs a single pass and prints a per-instrument table.
///
/// # Errors
/// Returns an error if configuration is invalid or a client cannot be built.
pub async fn run_scan(args: ScanArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    let summary = if args.dry_run {
        let mut scanner = build_scanner(&config, StdoutNotifier)?;
        scanner.scan_pass().await
    } else {
        config
            .validate_telegram()
            .context("Telegram credentials are required unless --dry-run is set")?;
        let notifier = TelegramNotifier::from_config(&config.telegram)?;
        let mut scanner = build_scanner(&config, notifier)?;
        scanner.scan_pass().await
    };

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &PassSummary) {
    println!(
        "Scan finished in {}s: {} signal(s), {} on cooldown, {} error(s)",
        (summary.finished_at - summary.started_at).num_seconds(),
        summary.signals(),
        summary.on_cooldown(),
        summary.failures()
    );
    for report in &summary.reports {
        println!("  {:<12} {}", report.symbol, describe(report));
    }
}

fn describe(report: &InstrumentReport) -> String {
    match &report.outcome {
        ScanOutcome::Signal(signal) => {
            let delivery = match report.delivered {
                Some(false) => " (delivery failed)",
                _ => "",
            };
            format!(
                "SIGNAL {} q={} entry={:.4} stop={:.4}{delivery}",
                signal.entry.confidence, signal.entry.quality, signal.levels.entry, signal.levels.stop_loss
            )
        }
        ScanOutcome::OnCooldown { remaining } => {
            format!("cooldown ({}m left)", remaining.num_minutes())
        }
        ScanOutcome::NoSetup(NoSetupReason::IndeterminateRegime(e)) => {
            format!("no trade, regime indeterminate: {e}")
        }
        ScanOutcome::NoSetup(NoSetupReason::RegimeBlocked(regime)) => format!(
            "no trade, regime {} (atr ratio {:.2}, 3d gain {:.1}%)",
            regime.state, regime.atr_ratio, regime.gain_3d_pct
        ),
        ScanOutcome::NoSetup(NoSetupReason::NoEntry { trend, .. }) => {
            format!("no entry (htf trend {trend})")
        }
        ScanOutcome::Failed(e) => format!("error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crypto_signal_core::{RegimeAssessment, RegimeState, TrendLabel};

    fn report(outcome: ScanOutcome) -> InstrumentReport {
        InstrumentReport {
            symbol: "SOL/USDT".to_string(),
            outcome,
            delivered: None,
        }
    }

    #[test]
    fn describes_cooldown_in_minutes() {
        let text = describe(&report(ScanOutcome::OnCooldown {
            remaining: Duration::minutes(42),
        }));
        assert_eq!(text, "cooldown (42m left)");
    }

    #[test]
    fn describes_blocked_regime() {
        let regime = RegimeAssessment {
            state: RegimeState::Contraction,
            atr_ratio: 1.1,
            atr_short: 1.1,
            atr_long: 1.0,
            gain_3d_pct: 2.0,
            trading_allowed: false,
        };
        let text = describe(&report(ScanOutcome::NoSetup(NoSetupReason::RegimeBlocked(regime))));
        assert_eq!(text, "no trade, regime CONTRACTION (atr ratio 1.10, 3d gain 2.0%)");
    }

    #[test]
    fn describes_missing_entry() {
        let regime = RegimeAssessment {
            state: RegimeState::Expansion,
            atr_ratio: 1.5,
            atr_short: 1.5,
            atr_long: 1.0,
            gain_3d_pct: 0.0,
            trading_allowed: true,
        };
        let text = describe(&report(ScanOutcome::NoSetup(NoSetupReason::NoEntry {
            regime,
            trend: TrendLabel::Neutral,
        })));
        assert_eq!(text, "no entry (htf trend NEUTRAL)");
    }
}
