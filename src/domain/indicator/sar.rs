//! Parabolic SAR with explicit trend state.
//!
//! SAR_next = SAR + af * (EP - SAR)
//!
//! In an uptrend the SAR may not rise above the lows of the two bars before
//! the current one; in a downtrend it may not fall below their highs. When
//! the current bar pierces the SAR the trend reverses: SAR jumps to the old
//! extreme point, the extreme resets to the current bar and af resets to its
//! step. Otherwise a new extreme raises af by one step, capped at the maximum.

use super::{Indicator, Sentiment};
use crate::domain::window::RollingWindow;

pub const DEFAULT_STEP: f64 = 0.02;
pub const DEFAULT_MAXIMUM: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SarTrend {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SarState {
    trend: SarTrend,
    sar: f64,
    extreme_point: f64,
    acceleration: f64,
}

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    step: f64,
    maximum: f64,
    state: Option<SarState>,
}

impl ParabolicSar {
    pub fn new(step: f64, maximum: f64) -> Self {
        ParabolicSar {
            step,
            maximum,
            state: None,
        }
    }

    /// Current acceleration factor; the step value before initialisation.
    pub fn acceleration(&self) -> f64 {
        self.state.map_or(self.step, |s| s.acceleration)
    }

    pub fn trend(&self) -> Option<SarTrend> {
        self.state.map(|s| s.trend)
    }

    pub fn sar(&self) -> Option<f64> {
        self.state.map(|s| s.sar)
    }

    pub fn extreme_point(&self) -> Option<f64> {
        self.state.map(|s| s.extreme_point)
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        ParabolicSar::new(DEFAULT_STEP, DEFAULT_MAXIMUM)
    }
}

impl Indicator for ParabolicSar {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        "Parabolic SAR"
    }

    fn update(&mut self, window: &RollingWindow) -> Sentiment {
        let highs = window.highs();
        let lows = window.lows();
        let len = highs.len();
        if len < 2 {
            return Sentiment::Neutral;
        }
        let (high, low) = (highs[len - 1], lows[len - 1]);

        let Some(mut s) = self.state else {
            self.state = Some(if high > highs[len - 2] {
                SarState {
                    trend: SarTrend::Up,
                    sar: lows[len - 2],
                    extreme_point: high,
                    acceleration: self.step,
                }
            } else {
                SarState {
                    trend: SarTrend::Down,
                    sar: highs[len - 2],
                    extreme_point: low,
                    acceleration: self.step,
                }
            });
            return Sentiment::Neutral;
        };

        // the two bars before the current one
        let prior = len.saturating_sub(3)..len - 1;
        s.sar += s.acceleration * (s.extreme_point - s.sar);

        match s.trend {
            SarTrend::Up => {
                s.sar = lows[prior].iter().copied().fold(s.sar, f64::min);
                if low < s.sar {
                    s = SarState {
                        trend: SarTrend::Down,
                        sar: s.extreme_point,
                        extreme_point: low,
                        acceleration: self.step,
                    };
                } else if high > s.extreme_point {
                    s.extreme_point = high;
                    s.acceleration = (s.acceleration + self.step).min(self.maximum);
                }
            }
            SarTrend::Down => {
                s.sar = highs[prior].iter().copied().fold(s.sar, f64::max);
                if high > s.sar {
                    s = SarState {
                        trend: SarTrend::Up,
                        sar: s.extreme_point,
                        extreme_point: high,
                        acceleration: self.step,
                    };
                } else if low < s.extreme_point {
                    s.extreme_point = low;
                    s.acceleration = (s.acceleration + self.step).min(self.maximum);
                }
            }
        }

        self.state = Some(s);
        match s.trend {
            SarTrend::Up => Sentiment::StrongBuy,
            SarTrend::Down => Sentiment::StrongSell,
        }
    }
}
