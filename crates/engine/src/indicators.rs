//! Moving-average and volatility indicators.
//!
//! Series-valued functions return one entry per input point so results line
//! up index-for-index with the candles they came from. Points without enough
//! history are `None`.

use crypto_signal_core::Candle;

/// True range per candle.
///
/// Index 0 has no previous close and is `None`.
#[must_use]
pub fn true_range(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(candles.len());
    if candles.is_empty() {
        return out;
    }
    out.push(None);
    for pair in candles.windows(2) {
        let prev_close = pair[0].close;
        let c = &pair[1];
        let tr = (c.high - c.low)
            .max((c.high - prev_close).abs())
            .max((c.low - prev_close).abs());
        out.push(Some(tr));
    }
    out
}

/// Average true range: simple mean of true range over the trailing `period` points.
///
/// Any window that includes an unavailable true range is unavailable, so the
/// first `period` points are `None`. Treating index 0 as `high - low` instead
/// would make `period - 1` points unavailable; the two agree on every value
/// whose window starts after index 0, including the latest value of any
/// series longer than `period`.
#[must_use]
pub fn atr(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range(candles), period)
}

/// Latest ATR value, if the series is long enough.
#[must_use]
pub fn latest_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() <= period {
        return None;
    }
    // Only the last `period + 1` candles contribute to the final window
    let tail = &candles[candles.len() - period - 1..];
    atr(tail, period).last().copied().flatten()
}

/// Simple moving average over the trailing `period` values.
#[must_use]
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    rolling_mean(&wrapped, period)
}

/// Exponential moving average with span `span` (alpha = 2 / (span + 1)).
///
/// Uses bias-adjusted weights over the whole history: the value at `t` is
/// `sum((1-a)^k * x[t-k]) / sum((1-a)^k)` for `k = 0..=t`. The first output
/// equals the first input, and no warm-up window is discarded.
#[must_use]
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    values
        .iter()
        .map(|&x| {
            numerator = x + decay * numerator;
            denominator = 1.0 + decay * denominator;
            numerator / denominator
        })
        .collect()
}

/// Latest EMA value, or `None` for an empty series.
#[must_use]
pub fn latest_ema(values: &[f64], span: usize) -> Option<f64> {
    ema(values, span).last().copied()
}

fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    #[allow(clippy::cast_precision_loss)]
    let divisor = period as f64;
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            window
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / divisor)
        })
        .collect()
}
