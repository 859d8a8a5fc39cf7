//! Exponential moving average recurrence.
//!
//! new = α·x + (1-α)·prev. The first observation (or an explicit seed)
//! initialises `prev`; there is no bias correction.

/// How α is derived from the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    /// α = 1/(n-1), used for RSI average gain/loss.
    Wilder,
    /// α = 2/(n+1), used by MACD.
    Standard,
}

impl Smoothing {
    pub fn alpha(self, period: usize) -> f64 {
        match self {
            Smoothing::Wilder => 1.0 / period.saturating_sub(1).max(1) as f64,
            Smoothing::Standard => 2.0 / (period as f64 + 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    alpha: f64,
    prev: Option<f64>,
}

impl Ema {
    pub fn new(period: usize, smoothing: Smoothing) -> Self {
        Ema {
            alpha: smoothing.alpha(period),
            prev: None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.prev
    }

    /// Feed `x`. The first observation becomes the average unchanged.
    pub fn update(&mut self, x: f64) -> f64 {
        if self.prev.is_none() {
            self.prev = Some(x);
            return x;
        }
        self.update_seeded(x, || x)
    }

    /// Feed `x`, seeding with `seed()` on the first call. The seed is only
    /// evaluated when there is no previous value.
    pub fn update_seeded(&mut self, x: f64, seed: impl FnOnce() -> f64) -> f64 {
        let prev = *self.prev.get_or_insert_with(seed);
        let next = self.alpha * x + (1.0 - self.alpha) * prev;
        self.prev = Some(next);
        next
    }
}
