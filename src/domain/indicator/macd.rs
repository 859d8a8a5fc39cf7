//! MACD (Moving Average Convergence Divergence), streamed.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three use k = 2/(n+1). The fast and slow averages are seeded with the
//! SMA of the trailing `n` closes on their first step; the signal line is
//! seeded with the first MACD value. Output is the sign of the histogram.

use super::ema::{Ema, Smoothing};
use super::{Indicator, Sentiment};
use crate::domain::window::{mean, RollingWindow};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    fast: Ema,
    slow: Ema,
    signal: Ema,
    last: Option<MacdPoint>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Macd {
            fast_period: fast,
            slow_period: slow,
            fast: Ema::new(fast, Smoothing::Standard),
            slow: Ema::new(slow, Smoothing::Standard),
            signal: Ema::new(signal, Smoothing::Standard),
            last: None,
        }
    }

    pub fn last(&self) -> Option<MacdPoint> {
        self.last
    }
}

impl Default for Macd {
    fn default() -> Self {
        Macd::new(DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
    }
}

impl Indicator for Macd {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "MACD"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        let Some(price) = window.last_close() else {
            return Sentiment::Neutral;
        };
        let (fast_period, slow_period) = (self.fast_period, self.slow_period);
        let fast = self
            .fast
            .update_seeded(price, || mean(window.trailing_closes(fast_period)));
        let slow = self
            .slow
            .update_seeded(price, || mean(window.trailing_closes(slow_period)));

        let line = fast - slow;
        let signal = self.signal.update(line);
        let histogram = line - signal;
        self.last = Some(MacdPoint {
            line,
            signal,
            histogram,
        });
        Sentiment::from_sign(histogram)
    }
}
