//! Streaming technical indicators.
//!
//! Every indicator is a small state machine stepped once per evaluated bar
//! through the [`Indicator`] trait:
//! - `Sentiment`: the five-valued vote consumed by the composite scorer
//! - `Indicator`: `update(window) -> Output`, one call per step
//! - one module per recurrence, each owning only its own state

pub mod adx;
pub mod atr;
pub mod cmf;
pub mod ema;
pub mod liquidity;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sar;
pub mod sma_cross;
pub mod vwap;
pub mod williams;

pub use adx::Adx;
pub use atr::Atr;
pub use cmf::ChaikinMoneyFlow;
pub use ema::Ema;
pub use liquidity::LiquidityGate;
pub use macd::Macd;
pub use obv::ObvTrend;
pub use rsi::Rsi;
pub use sar::{ParabolicSar, SarTrend};
pub use sma_cross::SmaCrossover;
pub use vwap::VwapDeviation;
pub use williams::WilliamsR;

use std::fmt;

use super::window::RollingWindow;

/// Discrete vote emitted by a banded indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sentiment {
    StrongSell,
    Sell,
    #[default]
    Neutral,
    Buy,
    StrongBuy,
}

impl Sentiment {
    pub const ALL: [Sentiment; 5] = [
        Sentiment::StrongSell,
        Sentiment::Sell,
        Sentiment::Neutral,
        Sentiment::Buy,
        Sentiment::StrongBuy,
    ];

    pub fn value(self) -> f64 {
        match self {
            Sentiment::StrongSell => -1.0,
            Sentiment::Sell => -0.2,
            Sentiment::Neutral => 0.0,
            Sentiment::Buy => 0.2,
            Sentiment::StrongBuy => 1.0,
        }
    }

    /// +1 / -1 / 0 by the sign of `x`. NaN maps to neutral.
    pub fn from_sign(x: f64) -> Self {
        if x > 0.0 {
            Sentiment::StrongBuy
        } else if x < 0.0 {
            Sentiment::StrongSell
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A stateful per-step calculator reading the shared rolling window.
pub trait Indicator {
    type Output;

    fn name(&self) -> &'static str;

    /// Advance the recurrence by one step. Must be called exactly once per
    /// evaluated bar; insufficient history yields a neutral output.
    fn update(&mut self, window: &RollingWindow) -> Self::Output;
}
