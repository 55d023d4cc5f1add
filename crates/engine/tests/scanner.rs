//! End-to-end scan passes against in-memory market data and a recording notifier.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crypto_signal_core::{
    Candle, Clock, Confidence, Interval, ManualClock, MarketDataProvider, MessageFormat, Notifier,
};
use crypto_signal_engine::{
    CooldownTracker, EngineConfig, NoSetupReason, ScanError, ScanOutcome, Scanner, SignalEngine,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================
// Fakes
// ============================================

#[derive(Default)]
struct FakeProvider {
    higher: HashMap<String, Vec<Candle>>,
    lower: HashMap<String, Vec<Candle>>,
    failing: HashSet<String>,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    fn with_series(mut self, symbol: &str, higher: Vec<Candle>, lower: Vec<Candle>) -> Self {
        self.higher.insert(symbol.to_string(), higher);
        self.lower.insert(symbol.to_string(), lower);
        self
    }

    fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        _limit: usize,
    ) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(symbol) {
            return Err(anyhow!("connection reset"));
        }
        let source = match interval {
            Interval::FourHours => &self.higher,
            _ => &self.lower,
        };
        Ok(source.get(symbol).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, text: &str, _format: MessageFormat) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("telegram unavailable"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ============================================
// Market data
// ============================================

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// 4h series climbing one point per candle: close > EMA50 > EMA200.
fn rising_higher() -> Vec<Candle> {
    (0..200)
        .map(|i| {
            let close = 100.0 + f64::from(i);
            Candle::new(
                start() + Duration::hours(4 * i64::from(i)),
                close - 0.5,
                close + 0.5,
                close - 1.0,
                close,
                1_000.0,
            )
        })
        .collect()
}

/// 1h series: calm ranges, a volatility burst over the last 14 candles, and
/// a bullish candle that dips through the EMA and closes above it on volume.
fn bouncing_lower() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..199)
        .map(|i| {
            let half = if i < 186 { 0.5 } else { 1.5 };
            Candle::new(
                start() + Duration::hours(i64::from(i)),
                100.0,
                100.0 + half,
                100.0 - half,
                100.0,
                100.0,
            )
        })
        .collect();
    candles.push(Candle::new(
        start() + Duration::hours(199),
        99.5,
        102.0,
        98.5,
        100.5,
        200.0,
    ));
    candles
}

/// 1h series with uniform ranges, so volatility never expands.
fn quiet_lower() -> Vec<Candle> {
    (0..200)
        .map(|i| {
            Candle::new(
                start() + Duration::hours(i64::from(i)),
                100.0,
                100.5,
                99.5,
                100.0,
                100.0,
            )
        })
        .collect()
}

fn scanner(
    provider: FakeProvider,
    notifier: RecordingNotifier,
    clock: ManualClock,
    symbols: &[&str],
) -> Scanner<FakeProvider, RecordingNotifier, ManualClock> {
    let engine = SignalEngine::new(
        EngineConfig::default(),
        CooldownTracker::new(Duration::hours(1)),
        clock,
    );
    Scanner::new(
        engine,
        provider,
        notifier,
        symbols.iter().map(ToString::to_string).collect(),
    )
    .with_notify_pause(std::time::Duration::ZERO)
}

// ============================================
// Signal and cooldown
// ============================================

#[tokio::test]
async fn bounce_in_expanding_regime_emits_signal() {
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), bouncing_lower());
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, notifier.clone(), clock, &["ETH/USDT"]);

    let summary = scanner.scan_pass().await;

    assert_eq!(summary.signals(), 1);
    let report = summary.report("ETH/USDT").unwrap();
    assert_eq!(report.delivered, Some(true));
    let signal = report.outcome.signal().unwrap();
    assert_eq!(signal.entry.quality, 4);
    assert_eq!(signal.entry.confidence, Confidence::High);
    assert!((signal.levels.entry - 100.5).abs() < 1e-9);
    assert!(signal.levels.stop_loss < signal.levels.entry);
    assert!(signal.levels.tp1 > signal.levels.entry);
    assert!(signal.regime.trading_allowed);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Pair: `ETH/USDT`"));
}

#[tokio::test]
async fn second_detection_within_cooldown_is_suppressed() {
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), bouncing_lower());
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, notifier.clone(), clock.clone(), &["ETH/USDT"]);

    let first = scanner.scan_pass().await;
    assert_eq!(first.signals(), 1);
    let stamped = clock.now();

    clock.advance(Duration::minutes(10));
    let second = scanner.scan_pass().await;

    assert_eq!(second.signals(), 0);
    assert_eq!(second.on_cooldown(), 1);
    match &second.report("ETH/USDT").unwrap().outcome {
        ScanOutcome::OnCooldown { remaining } => assert_eq!(*remaining, Duration::minutes(50)),
        other => panic!("expected cooldown, got {other:?}"),
    }
    assert_eq!(
        scanner.engine().cooldowns().last_signal("ETH/USDT"),
        Some(stamped)
    );
    assert_eq!(notifier.messages().len(), 1);
}

#[tokio::test]
async fn cooldown_skips_market_data_fetch() {
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), bouncing_lower());
    let calls = provider.call_counter();
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, RecordingNotifier::default(), clock, &["ETH/USDT"]);

    scanner.scan_pass().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let summary = scanner.scan_pass().await;
    assert_eq!(summary.on_cooldown(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn signals_resume_once_cooldown_elapses() {
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), bouncing_lower());
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, notifier.clone(), clock.clone(), &["ETH/USDT"]);

    assert_eq!(scanner.scan_pass().await.signals(), 1);

    clock.advance(Duration::seconds(3_600));
    let summary = scanner.scan_pass().await;

    assert_eq!(summary.signals(), 1);
    assert_eq!(notifier.messages().len(), 2);
    assert_eq!(
        scanner.engine().cooldowns().last_signal("ETH/USDT"),
        Some(clock.now())
    );
}

// ============================================
// Failure isolation
// ============================================

#[tokio::test]
async fn data_failure_does_not_stop_later_symbols() {
    let provider = FakeProvider::default()
        .with_failure("BTC/USDT")
        .with_series("ETH/USDT", rising_higher(), bouncing_lower());
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, notifier.clone(), clock, &["BTC/USDT", "ETH/USDT"]);

    let summary = scanner.scan_pass().await;

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.failures(), 1);
    assert_eq!(summary.signals(), 1);
    match &summary.report("BTC/USDT").unwrap().outcome {
        ScanOutcome::Failed(ScanError::DataUnavailable {
            symbol, interval, ..
        }) => {
            assert_eq!(symbol, "BTC/USDT");
            assert_eq!(*interval, Interval::FourHours);
        }
        other => panic!("expected data failure, got {other:?}"),
    }
    assert!(summary.report("ETH/USDT").unwrap().outcome.signal().is_some());
    assert!(!scanner
        .engine()
        .cooldowns()
        .is_cooling_down("BTC/USDT", summary.finished_at));
}

#[tokio::test]
async fn empty_series_is_reported_as_unavailable() {
    let provider = FakeProvider::default().with_series("SOL/USDT", rising_higher(), Vec::new());
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, RecordingNotifier::default(), clock, &["SOL/USDT"]);

    let summary = scanner.scan_pass().await;

    match &summary.report("SOL/USDT").unwrap().outcome {
        ScanOutcome::Failed(ScanError::DataUnavailable { interval, .. }) => {
            assert_eq!(*interval, Interval::OneHour);
        }
        other => panic!("expected data failure, got {other:?}"),
    }
}

#[tokio::test]
async fn quiet_market_produces_no_setup() {
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), quiet_lower());
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, notifier.clone(), clock, &["ETH/USDT"]);

    let summary = scanner.scan_pass().await;

    match &summary.report("ETH/USDT").unwrap().outcome {
        ScanOutcome::NoSetup(NoSetupReason::RegimeBlocked(regime)) => {
            assert!(!regime.trading_allowed);
        }
        other => panic!("expected blocked regime, got {other:?}"),
    }
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn short_history_is_indeterminate_not_failed() {
    let lower: Vec<Candle> = bouncing_lower().into_iter().skip(150).collect();
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), lower);
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, RecordingNotifier::default(), clock, &["ETH/USDT"]);

    let summary = scanner.scan_pass().await;

    assert_eq!(summary.failures(), 0);
    assert!(matches!(
        summary.report("ETH/USDT").unwrap().outcome,
        ScanOutcome::NoSetup(NoSetupReason::IndeterminateRegime(_))
    ));
}

#[tokio::test]
async fn delivery_failure_is_counted_and_cooldown_still_applies() {
    let provider = FakeProvider::default().with_series("ETH/USDT", rising_higher(), bouncing_lower());
    let notifier = RecordingNotifier::default();
    notifier.fail.store(true, Ordering::SeqCst);
    let clock = ManualClock::new(start() + Duration::days(30));
    let mut scanner = scanner(provider, notifier.clone(), clock.clone(), &["ETH/USDT"]);

    let summary = scanner.scan_pass().await;

    assert_eq!(summary.signals(), 1);
    assert_eq!(summary.delivery_failures(), 1);
    assert_eq!(summary.report("ETH/USDT").unwrap().delivered, Some(false));
    assert!(scanner
        .engine()
        .cooldowns()
        .is_cooling_down("ETH/USDT", clock.now()));
}

#[tokio::test]
async fn startup_announcement_lists_pairs() {
    let notifier = RecordingNotifier::default();
    let clock = ManualClock::new(start());
    let scanner = scanner(
        FakeProvider::default(),
        notifier.clone(),
        clock,
        &["BTC/USDT", "ETH/USDT"],
    );

    assert!(scanner.announce_startup().await);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("BTC/USDT, ETH/USDT"));
}
