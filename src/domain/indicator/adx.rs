//! ADX-style directional strength over the trailing `period + 1` bars.
//!
//! For each consecutive pair of bars:
//!   up_move   = high[i] - high[i-1]
//!   down_move = low[i-1] - low[i]
//!   +DM = up_move if up_move > down_move and up_move > 0, else 0
//!   -DM = down_move if down_move > up_move and down_move > 0, else 0
//!   TR  = true range against close[i-1]
//!
//! Smoothing is a plain mean over the period:
//!   +DI = mean(+DM) / mean(TR) * 100, -DI likewise
//!   DX  = |+DI - -DI| / (+DI + -DI) * 100
//!
//! DX below 20 is treated as no trend. Between 20 and 30 the dominant DI
//! gives a lean, at 30 or above a strong vote.

use super::{Indicator, Sentiment};
use crate::domain::ohlcv::true_range;
use crate::domain::window::{mean, RollingWindow};

const WEAK_TREND: f64 = 20.0;
const STRONG_TREND: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    last_dx: Option<f64>,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Adx {
            period: period.max(1),
            last_dx: None,
        }
    }

    /// Last DX magnitude, `None` when the previous step was neutral for lack
    /// of data or a zero denominator.
    pub fn last_dx(&self) -> Option<f64> {
        self.last_dx
    }
}

impl Indicator for Adx {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "ADX"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        self.last_dx = None;
        let n = self.period + 1;
        if window.len() < n {
            return Sentiment::Neutral;
        }
        let highs = window.trailing_highs(n);
        let lows = window.trailing_lows(n);
        let closes = window.trailing_closes(n);

        let mut tr = Vec::with_capacity(self.period);
        let mut plus_dm = Vec::with_capacity(self.period);
        let mut minus_dm = Vec::with_capacity(self.period);
        for i in 1..n {
            tr.push(true_range(highs[i], lows[i], closes[i - 1]));
            let up = highs[i] - highs[i - 1];
            let down = lows[i - 1] - lows[i];
            plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
            minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        }

        let smoothed_tr = mean(&tr);
        if smoothed_tr == 0.0 {
            return Sentiment::Neutral;
        }
        let plus_di = mean(&plus_dm) / smoothed_tr * 100.0;
        let minus_di = mean(&minus_dm) / smoothed_tr * 100.0;
        let di_sum = plus_di + minus_di;
        if di_sum == 0.0 {
            return Sentiment::Neutral;
        }
        let dx = (plus_di - minus_di).abs() / di_sum * 100.0;
        self.last_dx = Some(dx);

        let bullish = plus_di > minus_di;
        if dx < WEAK_TREND {
            Sentiment::Neutral
        } else if dx >= STRONG_TREND {
            if bullish { Sentiment::StrongBuy } else { Sentiment::StrongSell }
        } else if bullish {
            Sentiment::Buy
        } else {
            Sentiment::Sell
        }
    }
}
