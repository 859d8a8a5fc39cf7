//! OBV (On-Balance Volume) trend.
//!
//! If close > prev_close: OBV = OBV_prev + volume
//! If close < prev_close: OBV = OBV_prev - volume
//! If close == prev_close: OBV = OBV_prev
//!
//! The running series starts at 0 and is kept short: once it grows past
//! [`MAX_HISTORY`] entries only the newest [`KEEP_HISTORY`] survive. The vote
//! compares the latest OBV with the mean of the five entries before it.

use super::{Indicator, Sentiment};
use crate::domain::window::{mean, RollingWindow};

const MAX_HISTORY: usize = 20;
const KEEP_HISTORY: usize = 10;
const LOOKBACK: usize = 5;

#[derive(Debug, Clone)]
pub struct ObvTrend {
    history: Vec<f64>,
}

impl ObvTrend {
    pub fn new() -> Self {
        ObvTrend { history: vec![0.0] }
    }

    /// Current running OBV.
    pub fn value(&self) -> f64 {
        self.history.last().copied().unwrap_or(0.0)
    }
}

impl Default for ObvTrend {
    fn default() -> Self {
        ObvTrend::new()
    }
}

impl Indicator for ObvTrend {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "OBV"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        let closes = window.closes();
        if closes.len() < 2 {
            return Sentiment::Neutral;
        }
        let close = closes[closes.len() - 1];
        let prev_close = closes[closes.len() - 2];
        let volume = window.volumes().last().copied().unwrap_or(0.0);

        let prev = self.value();
        let obv = if close > prev_close {
            prev + volume
        } else if close < prev_close {
            prev - volume
        } else {
            prev
        };
        self.history.push(obv);
        if self.history.len() > MAX_HISTORY {
            self.history.drain(..self.history.len() - KEEP_HISTORY);
        }

        if self.history.len() < LOOKBACK {
            return Sentiment::Neutral;
        }
        let end = self.history.len() - 1;
        let start = end.saturating_sub(LOOKBACK);
        let baseline = mean(&self.history[start..end]);
        Sentiment::from_sign(obv - baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;

    fn step(obv: &mut ObvTrend, w: &mut RollingWindow, close: f64, volume: f64) -> Sentiment {
        w.push(&OhlcvBar::new(close, close, close, close, volume));
        obv.update(w)
    }

    #[test]
    fn accumulates_signed_volume() {
        let mut obv = ObvTrend::new();
        let mut w = RollingWindow::new(3);
        step(&mut obv, &mut w, 10.0, 100.0);
        step(&mut obv, &mut w, 11.0, 200.0);
        step(&mut obv, &mut w, 10.5, 50.0);
        step(&mut obv, &mut w, 10.5, 75.0);
        assert_eq!(obv.history, &[0.0, 200.0, 150.0, 150.0]);
    }

    #[test]
    fn neutral_until_five_entries() {
        let mut obv = ObvTrend::new();
        let mut w = RollingWindow::new(3);
        step(&mut obv, &mut w, 10.0, 100.0);
        for c in [11.0, 12.0, 13.0] {
            assert_eq!(step(&mut obv, &mut w, c, 100.0), Sentiment::Neutral);
        }
        assert_eq!(step(&mut obv, &mut w, 14.0, 100.0), Sentiment::StrongBuy);
    }

    #[test]
    fn falling_volume_pressure_is_bearish() {
        let mut obv = ObvTrend::new();
        let mut w = RollingWindow::new(3);
        let mut out = Sentiment::Neutral;
        for c in [10.0, 9.0, 8.0, 7.0, 6.0, 5.0] {
            out = step(&mut obv, &mut w, c, 100.0);
        }
        assert_eq!(out, Sentiment::StrongSell);
    }

    #[test]
    fn history_is_trimmed_past_twenty() {
        let mut obv = ObvTrend::new();
        let mut w = RollingWindow::new(3);
        step(&mut obv, &mut w, 1.0, 1.0);
        for i in 0..20 {
            step(&mut obv, &mut w, 2.0 + i as f64, 1.0);
        }
        // 21 entries collapse to the newest 10
        assert_eq!(obv.history.len(), 10);
        assert_eq!(obv.value(), 20.0);
    }
}
