#![allow(clippy::format_push_string)]

use crate::orchestrator::{NoSetupReason, ScanOutcome};
use crate::scanner::PassSummary;
use crypto_signal_core::SignalRecord;

/// Scale printed next to the quality score.
///
/// The scorer currently maxes out at 4; the scale is kept at 5 until the
/// product side decides otherwise.
pub const QUALITY_SCALE: u8 = 5;

/// Renders notifications as Telegram-flavoured Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalFormatter;

impl SignalFormatter {
    #[must_use]
    pub fn format_signal(&self, signal: &SignalRecord) -> String {
        let levels = &signal.levels;
        let [r1, r2, r3] = reward_labels(signal);
        let mut output = String::new();

        output.push_str(&format!("*{} SIGNAL*\n\n", signal.entry.direction));
        output.push_str(&format!("Pair: `{}`\n", signal.symbol));
        output.push_str(&format!("Pattern: {}\n", signal.entry.pattern));
        output.push_str(&format!(
            "Confidence: {} ({}/{QUALITY_SCALE})\n\n",
            signal.entry.confidence, signal.entry.quality
        ));

        output.push_str("ENTRY & EXITS\n\n");
        output.push_str(&format!("Entry: `{:.4}`\n\n", levels.entry));
        output.push_str(&format!("Stop Loss: `{:.4}`\n", levels.stop_loss));
        output.push_str(&format!("Risk: {:.2}%\n\n", levels.risk_pct));
        output.push_str("Take Profits:\n");
        output.push_str(&format!("TP1: `{:.4}` ({r1})\n", levels.tp1));
        output.push_str(&format!("TP2: `{:.4}` ({r2})\n", levels.tp2));
        output.push_str(&format!("TP3: `{:.4}` ({r3})\n\n", levels.tp3));

        output.push_str("CONDITIONS\n");
        output.push_str(&format!("Regime: {}\n", signal.regime.state));
        output.push_str(&format!("HTF Trend: {}\n", signal.htf_trend));
        output.push_str(&format!("ATR Ratio: {:.2}\n\n", signal.regime.atr_ratio));

        output.push_str(&format!("Time: {}\n", signal.timestamp.format("%H:%M:%S")));

        output
    }

    #[must_use]
    pub fn format_startup(&self, symbols: &[String]) -> String {
        format!(
            "*Bot Online*\nMonitoring signals...\nPairs: {}",
            symbols.join(", ")
        )
    }

    #[must_use]
    pub fn format_summary(&self, summary: &PassSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "*Scan Complete* ({})\n",
            summary.finished_at.format("%H:%M:%S")
        ));
        output.push_str(&format!(
            "Signals: {} | Cooldown: {} | Errors: {}\n",
            summary.signals(),
            summary.on_cooldown(),
            summary.failures()
        ));

        for report in &summary.reports {
            let status = match &report.outcome {
                ScanOutcome::Signal(_) if report.delivered == Some(false) => "signal (not delivered)",
                ScanOutcome::Signal(_) => "signal",
                ScanOutcome::OnCooldown { .. } => "cooldown",
                ScanOutcome::NoSetup(NoSetupReason::IndeterminateRegime(_)) => "regime indeterminate",
                ScanOutcome::NoSetup(NoSetupReason::RegimeBlocked(_)) => "regime blocked",
                ScanOutcome::NoSetup(NoSetupReason::NoEntry { .. }) => "no setup",
                ScanOutcome::Failed(_) => "error",
            };
            output.push_str(&format!("`{}`: {status}\n", report.symbol));
        }

        output
    }
}

/// "1.5R"-style labels from the distances actually used for the targets.
fn reward_labels(signal: &SignalRecord) -> [String; 3] {
    let levels = &signal.levels;
    let distance = levels.entry - levels.stop_loss;
    [levels.tp1, levels.tp2, levels.tp3].map(|tp| {
        if distance > 0.0 {
            format!("{:.1}R", (tp - levels.entry) / distance)
        } else {
            "n/a".to_string()
        }
    })
}
