//! Deviation of the close from a rolling VWAP.
//!
//! VWAP = sum(typical_price * volume) / sum(volume) over the last `period`
//! evaluated bars, typical price = (high + low + close) / 3. The vote is
//! banded on close / VWAP.

use std::collections::VecDeque;

use super::{Indicator, Sentiment};
use crate::domain::ohlcv::typical_price;
use crate::domain::window::RollingWindow;

pub const DEFAULT_PERIOD: usize = 20;

#[derive(Debug, Clone)]
pub struct VwapDeviation {
    period: usize,
    samples: VecDeque<(f64, f64)>,
    last_vwap: Option<f64>,
}

impl VwapDeviation {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        VwapDeviation {
            period,
            samples: VecDeque::with_capacity(period + 1),
            last_vwap: None,
        }
    }

    pub fn vwap(&self) -> Option<f64> {
        self.last_vwap
    }
}

impl Default for VwapDeviation {
    fn default() -> Self {
        VwapDeviation::new(DEFAULT_PERIOD)
    }
}

pub fn band(ratio: f64) -> Sentiment {
    if ratio >= 1.01 {
        Sentiment::StrongBuy
    } else if ratio >= 1.002 {
        Sentiment::Buy
    } else if ratio <= 0.99 {
        Sentiment::StrongSell
    } else if ratio <= 0.998 {
        Sentiment::Sell
    } else {
        Sentiment::Neutral
    }
}

impl Indicator for VwapDeviation {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "VWAP"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        self.last_vwap = None;
        let (Some(&high), Some(&low), Some(close), Some(&volume)) = (
            window.highs().last(),
            window.lows().last(),
            window.last_close(),
            window.volumes().last(),
        ) else {
            return Sentiment::Neutral;
        };

        self.samples.push_back((typical_price(high, low, close) * volume, volume));
        while self.samples.len() > self.period {
            self.samples.pop_front();
        }
        if self.samples.len() < self.period {
            return Sentiment::Neutral;
        }

        let (weighted, total_volume) = self
            .samples
            .iter()
            .fold((0.0, 0.0), |(w, v), &(pv, vol)| (w + pv, v + vol));
        if total_volume == 0.0 {
            return Sentiment::Neutral;
        }
        let vwap = weighted / total_volume;
        if vwap == 0.0 {
            return Sentiment::Neutral;
        }
        self.last_vwap = Some(vwap);
        band(close / vwap)
    }
}
