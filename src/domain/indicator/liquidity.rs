//! Volume spike gate: the newest bar must trade more than `factor` times the
//! average of the earlier bars in the window.

use super::Indicator;
use crate::domain::window::{mean, RollingWindow};

pub const DEFAULT_FACTOR: f64 = 1.3;

#[derive(Debug, Clone)]
pub struct LiquidityGate {
    factor: f64,
}

impl LiquidityGate {
    pub fn new(factor: f64) -> Self {
        LiquidityGate { factor }
    }
}

impl Default for LiquidityGate {
    fn default() -> Self {
        LiquidityGate::new(DEFAULT_FACTOR)
    }
}

impl Indicator for LiquidityGate {
    type Output = bool;

    fn name(&self) -> &'static str {
        "liquidity"
    }

    fn update(&mut self, window: &RollingWindow) -> bool {
        let Some((&latest, earlier)) = window.volumes().split_last() else {
            return false;
        };
        if earlier.is_empty() {
            return false;
        }
        latest > self.factor * mean(earlier)
    }
}
