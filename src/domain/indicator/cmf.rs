//! Chaikin Money Flow over its own trailing buffer.
//!
//! Money flow multiplier = ((close - low) - (high - close)) / (high - low),
//! 0 when high == low. CMF = sum(multiplier * volume) / sum(volume) over the
//! last `period` evaluated bars.

use std::collections::VecDeque;

use super::{Indicator, Sentiment};
use crate::domain::window::RollingWindow;

pub const DEFAULT_PERIOD: usize = 20;

#[derive(Debug, Clone)]
pub struct ChaikinMoneyFlow {
    period: usize,
    flows: VecDeque<(f64, f64)>,
    last: Option<f64>,
}

impl ChaikinMoneyFlow {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        ChaikinMoneyFlow {
            period,
            flows: VecDeque::with_capacity(period + 1),
            last: None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.last
    }
}

impl Default for ChaikinMoneyFlow {
    fn default() -> Self {
        ChaikinMoneyFlow::new(DEFAULT_PERIOD)
    }
}

pub fn money_flow_multiplier(high: f64, low: f64, close: f64) -> f64 {
    if high == low {
        0.0
    } else {
        (2.0 * close - high - low) / (high - low)
    }
}

pub fn band(cmf: f64) -> Sentiment {
    if cmf >= 0.25 {
        Sentiment::StrongBuy
    } else if cmf >= 0.2 {
        Sentiment::Buy
    } else if cmf <= -0.25 {
        Sentiment::StrongSell
    } else if cmf <= -0.2 {
        Sentiment::Sell
    } else {
        Sentiment::Neutral
    }
}

impl Indicator for ChaikinMoneyFlow {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "CMF"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        self.last = None;
        let (Some(&high), Some(&low), Some(close), Some(&volume)) = (
            window.highs().last(),
            window.lows().last(),
            window.last_close(),
            window.volumes().last(),
        ) else {
            return Sentiment::Neutral;
        };

        self.flows
            .push_back((money_flow_multiplier(high, low, close) * volume, volume));
        while self.flows.len() > self.period {
            self.flows.pop_front();
        }
        if self.flows.len() < self.period {
            return Sentiment::Neutral;
        }

        let (flow, total_volume) = self
            .flows
            .iter()
            .fold((0.0, 0.0), |(f, v), &(mf, vol)| (f + mf, v + vol));
        if total_volume == 0.0 {
            return Sentiment::Neutral;
        }
        let cmf = flow / total_volume;
        self.last = Some(cmf);
        band(cmf)
    }
}
