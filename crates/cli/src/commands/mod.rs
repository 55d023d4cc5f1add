//! CLI commands for the signal bot.

pub mod check_config;
pub mod run;
pub mod scan;

pub use check_config::{run_check_config, CheckConfigArgs};
pub use run::{run_bot, RunArgs};
pub use scan::{run_scan, ScanArgs};

use anyhow::{Context, Result};
use crypto_signal_binance::BinanceClient;
use crypto_signal_core::{AppConfig, ConfigLoader, Notifier, SystemClock};
use crypto_signal_engine::{CooldownTracker, EngineConfig, Scanner, SignalEngine};

/// Loads and validates configuration from `path`.
fn load_config(path: &str) -> Result<AppConfig> {
    let config = ConfigLoader::load_from(path)?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Wires the Binance provider, a fresh cooldown map and the system clock
/// around the given notifier.
fn build_scanner<N: Notifier>(
    config: &AppConfig,
    notifier: N,
) -> Result<Scanner<BinanceClient, N, SystemClock>> {
    let provider = BinanceClient::from_config(&config.exchange)?;
    let engine = SignalEngine::new(
        EngineConfig::from(config),
        CooldownTracker::new(config.scanner.signal_cooldown()?),
        SystemClock,
    );

    Ok(Scanner::new(engine, provider, notifier, config.scanner.symbols.clone())
        .with_notify_pause(config.scanner.notify_pause()))
}
