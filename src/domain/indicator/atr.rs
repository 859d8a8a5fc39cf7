//! ATR (Average True Range) over the trailing window.
//!
//! True Range = max(high - low, |high - prev_close|, |low - prev_close|)
//! ATR = simple mean of the last `period` true ranges.
//!
//! When the window holds fewer than `period + 1` bars there is no genuine
//! previous close for the oldest bar. The trailing closes rotated right by one
//! stand in as previous closes, and the first bar's true range is forced to
//! its own high - low range.

use super::Indicator;
use crate::domain::ohlcv::true_range;
use crate::domain::window::{mean, RollingWindow};

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    last: f64,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Atr {
            period: period.max(1),
            last: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.last
    }
}

impl Default for Atr {
    fn default() -> Self {
        Atr::new(DEFAULT_PERIOD)
    }
}

/// Mean true range of the trailing `period` bars of `window`. Fewer than two
/// bars yields 0.
pub fn average_true_range(window: &RollingWindow, period: usize) -> f64 {
    let closes = window.closes();
    if closes.len() < 2 {
        return 0.0;
    }
    let highs = window.trailing_highs(period);
    let lows = window.trailing_lows(period);

    let ranges: Vec<f64> = if closes.len() > period {
        let prev = &closes[closes.len() - period - 1..closes.len() - 1];
        highs
            .iter()
            .zip(lows)
            .zip(prev)
            .map(|((&h, &l), &pc)| true_range(h, l, pc))
            .collect()
    } else {
        let tail = window.trailing_closes(period);
        highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&h, &l))| {
                if i == 0 {
                    h - l
                } else {
                    true_range(h, l, tail[i - 1])
                }
            })
            .collect()
    };
    mean(&ranges)
}

impl Indicator for Atr {
    type Output = f64;

    fn name(&self) -> &'static str {
        "ATR"
    }

    fn update(&mut self, window: &RollingWindow) -> f64 {
        self.last = average_true_range(window, self.period);
        self.last
    }
}
