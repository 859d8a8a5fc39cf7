#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use confluence::domain::backtest::BacktestConfig;
use confluence::domain::error::ConfluenceError;
pub use confluence::domain::ohlcv::OhlcvBar;
use confluence::ports::data_port::BarSource;
use std::collections::VecDeque;
use std::io::Write;

/// In-memory bar feed. An optional error is returned once the bars run out.
pub struct MockBarSource {
    bars: VecDeque<OhlcvBar>,
    error: Option<String>,
}

impl MockBarSource {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self {
            bars: bars.into(),
            error: None,
        }
    }

    pub fn failing_after(bars: Vec<OhlcvBar>, reason: &str) -> Self {
        Self {
            bars: bars.into(),
            error: Some(reason.to_string()),
        }
    }
}

impl BarSource for MockBarSource {
    fn next_bar(&mut self) -> Result<Option<OhlcvBar>, ConfluenceError> {
        if let Some(bar) = self.bars.pop_front() {
            return Ok(Some(bar));
        }
        match self.error.take() {
            Some(reason) => Err(ConfluenceError::DataSource { reason }),
            None => Ok(None),
        }
    }
}

pub fn minute(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        + TimeDelta::minutes(i as i64)
}

pub fn make_bar(i: usize, high: f64, low: f64, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar::new(close, high, low, close, volume).with_time(minute(i))
}

pub fn flat_bars(n: usize, price: f64) -> Vec<OhlcvBar> {
    (0..n)
        .map(|i| make_bar(i, price + 0.0005, price - 0.0005, price, 1000.0))
        .collect()
}

/// Defaults with a 15-bar MACD slow period, so the window holds 15 bars.
pub fn short_window_config() -> BacktestConfig {
    let mut config = BacktestConfig::default();
    config.indicators.macd_slow = 15;
    config
}

pub const PULLBACK_REFERENCE: f64 = 1.10112;
pub const PULLBACK_ENTRY: f64 = 1.10108;
pub const PULLBACK_CLOSE: f64 = 1.1010;
/// Thirteen trend bars ranging 0.0017 plus the last bar's 0.0019. Shared by
/// the pullback and rally scenarios.
pub const PULLBACK_ATR: f64 = (13.0 * 0.0017 + 0.0019) / 14.0;

/// A slow uptrend of 29 bars whose last bar spikes volume, followed by a
/// pullback bar. With [`short_window_config`] the spike bar arms a long at
/// [`PULLBACK_REFERENCE`] and the pullback confirms it at [`PULLBACK_ENTRY`].
pub fn uptrend_pullback() -> Vec<OhlcvBar> {
    uptrend_pullback_of(30)
}

/// [`uptrend_pullback`] stretched to `len` bars. Under the default config
/// (26-bar window) a 43-bar series arms on bar 41 and enters on bar 42.
pub fn uptrend_pullback_of(len: usize) -> Vec<OhlcvBar> {
    let spike = len - 2;
    let mut bars: Vec<OhlcvBar> = (0..=spike)
        .map(|i| {
            let close = 1.1 + i as f64 * 0.00004;
            let volume = if i == spike { 3000.0 } else { 1000.0 };
            make_bar(i, close + 0.0016, close - 0.0001, close, volume)
        })
        .collect();
    let close = 1.1 + spike as f64 * 0.00004 - 0.00012;
    bars.push(make_bar(spike + 1, close + 0.0019, close, close, 500.0));
    bars
}

pub const RALLY_REFERENCE: f64 = 1.09888;
pub const RALLY_ENTRY: f64 = 1.09892;
pub const RALLY_CLOSE: f64 = 1.099;

/// Mirror of [`uptrend_pullback`]: a slow downtrend with a volume spike on
/// bar 28 arms a short at [`RALLY_REFERENCE`], and the rally on bar 29
/// confirms it at [`RALLY_ENTRY`].
pub fn downtrend_rally() -> Vec<OhlcvBar> {
    let mut bars: Vec<OhlcvBar> = (0..29)
        .map(|i| {
            let close = 1.1 - i as f64 * 0.00004;
            let volume = if i == 28 { 3000.0 } else { 1000.0 };
            make_bar(i, close + 0.0001, close - 0.0016, close, volume)
        })
        .collect();
    let close = 1.1 - 28.0 * 0.00004 + 0.00012;
    bars.push(make_bar(29, close, close - 0.0019, close, 500.0));
    bars
}

pub fn bars_to_csv(bars: &[OhlcvBar]) -> String {
    bars.iter()
        .map(|b| {
            format!(
                "{},{},{},{},{},{}\n",
                b.time
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                b.open,
                b.high,
                b.low,
                b.close,
                b.volume
            )
        })
        .collect()
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
