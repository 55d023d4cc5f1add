//! Long-running scan loop.
//!
//! Each cycle runs one full pass, then sleeps for the configured interval.
//! Ctrl+C lets the current pass finish and cuts the sleep short.

use super::{build_scanner, load_config};
use anyhow::{Context, Result};
use clap::Args;
use crypto_signal_telegram::TelegramNotifier;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

/// Runs the bot until Ctrl+C.
///
/// # Errors
/// Returns an error if configuration is invalid or a client cannot be built.
/// Failures during a pass are logged and never stop the loop.
pub async fn run_bot(args: RunArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    config
        .validate_telegram()
        .context("Telegram credentials are required for the run command")?;

    let notifier = TelegramNotifier::from_config(&config.telegram)?;
    let mut scanner = build_scanner(&config, notifier)?;
    let scan_interval = config.scanner.scan_interval();

    let stop = Arc::new(AtomicBool::new(false));
    let wake = Arc::new(Notify::new());
    {
        let stop = Arc::clone(&stop);
        let wake = Arc::clone(&wake);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                match on_interrupt(&stop) {
                    Interrupt::Graceful => {
                        info!("Received Ctrl+C, stopping after the current pass (Ctrl+C again to force)");
                        wake.notify_one();
                    }
                    Interrupt::Force => {
                        warn!("Received second Ctrl+C, exiting immediately");
                        std::process::exit(130);
                    }
                }
            }
        });
    }

    info!(
        symbols = ?config.scanner.symbols,
        higher = %config.scanner.higher_timeframe,
        lower = %config.scanner.lower_timeframe,
        interval_secs = scan_interval.as_secs(),
        "Signal bot starting"
    );
    if !scanner.announce_startup().await {
        warn!("Startup announcement was not delivered");
    }

    let mut cycle: u64 = 0;
    while !stop.load(Ordering::SeqCst) {
        cycle += 1;
        let summary = scanner.scan_pass().await;
        info!(
            cycle,
            signals = summary.signals(),
            failures = summary.failures(),
            delivery_failures = summary.delivery_failures(),
            "Cycle complete"
        );

        if config.scanner.send_pass_summary {
            scanner.announce_summary(&summary).await;
        }

        if stop.load(Ordering::SeqCst) {
            break;
        }
        tokio::select! {
            () = tokio::time::sleep(scan_interval) => {}
            () = wake.notified() => {}
        }
    }

    info!(cycles = cycle, "Signal bot stopped");
    Ok(())
}

/// What a Ctrl+C should do given the current stop flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// First request: finish the pass, then stop.
    Graceful,
    /// Stop already requested: exit without waiting.
    Force,
}

fn on_interrupt(stop: &AtomicBool) -> Interrupt {
    if stop.swap(true, Ordering::SeqCst) {
        Interrupt::Force
    } else {
        Interrupt::Graceful
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interrupt_is_graceful_second_forces_exit() {
        let stop = AtomicBool::new(false);

        assert_eq!(on_interrupt(&stop), Interrupt::Graceful);
        assert!(stop.load(Ordering::SeqCst));
        assert_eq!(on_interrupt(&stop), Interrupt::Force);
        assert_eq!(on_interrupt(&stop), Interrupt::Force);
    }
}
