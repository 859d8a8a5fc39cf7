//! Williams %R over the trailing `period` bars.
//!
//! %R = ((highest_high - close) / (highest_high - lowest_low)) * -100
//!
//! The result lies in [-100, 0]. Near 0 the close sits at the top of the
//! range (overbought), near -100 at the bottom (oversold).

use super::{Indicator, Sentiment};
use crate::domain::window::RollingWindow;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    last: Option<f64>,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        WilliamsR {
            period: period.max(1),
            last: None,
        }
    }

    /// Last computed %R, `None` if the range was degenerate.
    pub fn value(&self) -> Option<f64> {
        self.last
    }
}

pub fn band(percent_r: f64) -> Sentiment {
    if percent_r > -20.0 && percent_r <= 0.0 {
        Sentiment::StrongSell
    } else if (-100.0..=-80.0).contains(&percent_r) {
        Sentiment::StrongBuy
    } else if percent_r < -70.0 {
        Sentiment::Buy
    } else if percent_r > -30.0 {
        Sentiment::Sell
    } else {
        Sentiment::Neutral
    }
}

impl Indicator for WilliamsR {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "Williams %R"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        self.last = None;
        let Some(close) = window.last_close() else {
            return Sentiment::Neutral;
        };
        let highest = window
            .trailing_highs(self.period)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = window
            .trailing_lows(self.period)
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        let range = highest - lowest;
        if range == 0.0 || !range.is_finite() {
            return Sentiment::Neutral;
        }
        let percent_r = (highest - close) / range * -100.0;
        self.last = Some(percent_r);
        band(percent_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::{window_from_bars, window_from_closes};
    use crate::domain::ohlcv::OhlcvBar;
    use approx::assert_relative_eq;

    #[test]
    fn bands() {
        assert_eq!(band(0.0), Sentiment::StrongSell);
        assert_eq!(band(-10.0), Sentiment::StrongSell);
        assert_eq!(band(-20.0), Sentiment::Sell);
        assert_eq!(band(-25.0), Sentiment::Sell);
        assert_eq!(band(-50.0), Sentiment::Neutral);
        assert_eq!(band(-75.0), Sentiment::Buy);
        assert_eq!(band(-80.0), Sentiment::StrongBuy);
        assert_eq!(band(-100.0), Sentiment::StrongBuy);
    }

    #[test]
    fn close_at_top_of_range_is_overbought() {
        let bars = [
            OhlcvBar::new(1.0, 2.0, 1.0, 1.5, 1.0),
            OhlcvBar::new(1.5, 3.0, 1.5, 3.0, 1.0),
        ];
        let mut w = WilliamsR::new(14);
        assert_eq!(w.update(&window_from_bars(&bars)), Sentiment::StrongSell);
        assert_relative_eq!(w.value().unwrap(), 0.0);
    }

    #[test]
    fn close_near_bottom_is_oversold() {
        let bars = [
            OhlcvBar::new(2.0, 3.0, 2.0, 2.5, 1.0),
            OhlcvBar::new(2.5, 2.5, 1.0, 1.1, 1.0),
        ];
        let mut w = WilliamsR::new(14);
        assert_eq!(w.update(&window_from_bars(&bars)), Sentiment::StrongBuy);
        assert_relative_eq!(w.value().unwrap(), -95.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_range_is_neutral() {
        let w = window_from_closes(&[1.0, 1.0, 1.0], 0.0, 1.0);
        let mut r = WilliamsR::new(3);
        assert_eq!(r.update(&w), Sentiment::Neutral);
        assert_eq!(r.value(), None);
    }

    #[test]
    fn only_trailing_period_counts() {
        // the spike in the first bar falls outside a period of 2
        let bars = [
            OhlcvBar::new(1.0, 9.0, 1.0, 1.0, 1.0),
            OhlcvBar::new(1.0, 2.0, 1.0, 1.5, 1.0),
            OhlcvBar::new(1.5, 2.0, 1.0, 1.5, 1.0),
        ];
        let mut r = WilliamsR::new(2);
        r.update(&window_from_bars(&bars));
        assert_relative_eq!(r.value().unwrap(), -50.0, epsilon = 1e-12);
    }
}
