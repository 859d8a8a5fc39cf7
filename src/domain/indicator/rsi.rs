//! RSI (Relative Strength Index), streamed one delta at a time.
//!
//! Average gain and loss are independent Wilder EMAs (α = 1/(n-1)) seeded by
//! their first observation.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Bands: above overbought → strong sell, below oversold → strong buy,
//! below 40 → buy lean, above 60 → sell lean, otherwise neutral.

use super::ema::{Ema, Smoothing};
use super::{Indicator, Sentiment};
use crate::domain::window::RollingWindow;

const BUY_LEAN_BELOW: f64 = 40.0;
const SELL_LEAN_ABOVE: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    overbought: f64,
    oversold: f64,
    avg_gain: Ema,
    avg_loss: Ema,
    last: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        Rsi {
            overbought,
            oversold,
            avg_gain: Ema::new(period, Smoothing::Wilder),
            avg_loss: Ema::new(period, Smoothing::Wilder),
            last: None,
        }
    }

    /// Most recent RSI value, `None` before the first delta.
    pub fn value(&self) -> Option<f64> {
        self.last
    }

    pub fn band(&self, rsi: f64) -> Sentiment {
        if rsi > self.overbought {
            Sentiment::StrongSell
        } else if rsi < self.oversold {
            Sentiment::StrongBuy
        } else if rsi < BUY_LEAN_BELOW {
            Sentiment::Buy
        } else if rsi > SELL_LEAN_ABOVE {
            Sentiment::Sell
        } else {
            Sentiment::Neutral
        }
    }
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

impl Indicator for Rsi {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "RSI"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        let closes = window.closes();
        if closes.len() < 2 {
            return Sentiment::Neutral;
        }
        let delta = closes[closes.len() - 1] - closes[closes.len() - 2];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };

        let avg_gain = self.avg_gain.update(gain);
        let avg_loss = self.avg_loss.update(loss);
        let rsi = rsi_from_averages(avg_gain, avg_loss);
        self.last = Some(rsi);
        self.band(rsi)
    }
}
