//! Fixed-capacity trailing window of bar fields.
//!
//! Each field is kept in its own contiguous buffer so indicators can borrow
//! plain `&[f64]` slices. Once the window is at capacity a push shifts every
//! field left by one and writes the new sample into the last slot, so
//! chronological order is never disturbed.

use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    volumes: Vec<f64>,
}

impl RollingWindow {
    /// A zero capacity is bumped to one so the window always holds the
    /// latest bar.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RollingWindow {
            capacity,
            closes: Vec::with_capacity(capacity),
            highs: Vec::with_capacity(capacity),
            lows: Vec::with_capacity(capacity),
            volumes: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.closes.len() == self.capacity
    }

    pub fn push(&mut self, bar: &OhlcvBar) {
        let full = self.is_full();
        shift_in(&mut self.closes, bar.close, full);
        shift_in(&mut self.highs, bar.high, full);
        shift_in(&mut self.lows, bar.low, full);
        shift_in(&mut self.volumes, bar.volume, full);
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Latest `n` closes. Asking for more than is held returns the whole
    /// history rather than an error; callers needing an exact length must
    /// check [`len`](Self::len) first.
    pub fn trailing_closes(&self, n: usize) -> &[f64] {
        trailing(&self.closes, n)
    }

    pub fn trailing_highs(&self, n: usize) -> &[f64] {
        trailing(&self.highs, n)
    }

    pub fn trailing_lows(&self, n: usize) -> &[f64] {
        trailing(&self.lows, n)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

fn shift_in(buf: &mut Vec<f64>, value: f64, full: bool) {
    if full {
        buf.copy_within(1.., 0);
        if let Some(last) = buf.last_mut() {
            *last = value;
        }
    } else {
        buf.push(value);
    }
}

fn trailing(buf: &[f64], n: usize) -> &[f64] {
    &buf[buf.len().saturating_sub(n)..]
}

/// Arithmetic mean, accumulated as offsets from the first element so a
/// constant series averages to exactly that constant.
pub(crate) fn mean(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let offset: f64 = values.iter().map(|v| v - first).sum();
    first + offset / values.len() as f64
}
