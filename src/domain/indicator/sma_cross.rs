//! Fast/slow simple moving average crossover.
//!
//! +1 when the fast average moves above the slow one (slow was >= fast on
//! the previous step), -1 on the mirror transition, 0 otherwise. The first
//! call only records the baseline.

use super::{Indicator, Sentiment};
use crate::domain::window::{mean, RollingWindow};

#[derive(Debug, Clone)]
pub struct SmaCrossover {
    fast_period: usize,
    slow_period: usize,
    prev: Option<(f64, f64)>,
}

impl SmaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        SmaCrossover {
            fast_period,
            slow_period,
            prev: None,
        }
    }
}

impl Indicator for SmaCrossover {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "SMA crossover"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        if window.is_empty() {
            return Sentiment::Neutral;
        }
        let fast = mean(window.trailing_closes(self.fast_period));
        let slow = mean(window.trailing_closes(self.slow_period));

        let signal = match self.prev {
            None => Sentiment::Neutral,
            Some((prev_fast, prev_slow)) => {
                if slow < fast && prev_slow >= prev_fast {
                    Sentiment::StrongBuy
                } else if slow > fast && prev_slow <= prev_fast {
                    Sentiment::StrongSell
                } else {
                    Sentiment::Neutral
                }
            }
        };
        self.prev = Some((fast, slow));
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;

    fn feed(cross: &mut SmaCrossover, window: &mut RollingWindow, close: f64) -> Sentiment {
        window.push(&OhlcvBar::new(close, close, close, close, 1.0));
        cross.update(window)
    }

    #[test]
    fn first_call_is_baseline() {
        let mut cross = SmaCrossover::new(2, 4);
        let mut w = RollingWindow::new(4);
        for c in [1.0, 2.0, 3.0] {
            w.push(&OhlcvBar::new(c, c, c, c, 1.0));
        }
        assert_eq!(feed(&mut cross, &mut w, 10.0), Sentiment::Neutral);
    }

    #[test]
    fn warmup_is_neutral_for_any_history() {
        let mut w = RollingWindow::new(5);
        for c in [1.0, 1.5, 0.7, 2.0, 1.2] {
            w.push(&OhlcvBar::new(c, c, c, c, 1.0));
        }
        assert_eq!(SmaCrossover::new(2, 5).update(&w), Sentiment::Neutral);
        assert_eq!(SmaCrossover::new(2, 5).update(&w), Sentiment::Neutral);
    }

    #[test]
    fn detects_golden_cross() {
        let mut cross = SmaCrossover::new(2, 4);
        let mut w = RollingWindow::new(4);
        for c in [5.0, 5.0, 5.0, 5.0] {
            feed(&mut cross, &mut w, c);
        }
        // fast jumps above slow
        assert_eq!(feed(&mut cross, &mut w, 9.0), Sentiment::StrongBuy);
        // staying above is not a new cross
        assert_eq!(feed(&mut cross, &mut w, 9.5), Sentiment::Neutral);
    }

    #[test]
    fn detects_death_cross() {
        let mut cross = SmaCrossover::new(2, 4);
        let mut w = RollingWindow::new(4);
        for c in [5.0, 5.0, 5.0, 5.0] {
            feed(&mut cross, &mut w, c);
        }
        assert_eq!(feed(&mut cross, &mut w, 1.0), Sentiment::StrongSell);
        assert_eq!(feed(&mut cross, &mut w, 0.5), Sentiment::Neutral);
    }

    #[test]
    fn flat_series_never_crosses() {
        let mut cross = SmaCrossover::new(3, 7);
        let mut w = RollingWindow::new(7);
        for _ in 0..50 {
            assert_eq!(feed(&mut cross, &mut w, 1.2345), Sentiment::Neutral);
        }
    }
}
