//! OHLCV bar representation.

use chrono::NaiveDateTime;

use super::error::ConfluenceError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub time: Option<NaiveDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        OhlcvBar {
            time: None,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn with_time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Reject bars that would poison a recurrence: non-finite fields,
    /// an inverted range or negative volume.
    pub fn validate(&self, index: usize) -> Result<(), ConfluenceError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ConfluenceError::MalformedBar {
                    index,
                    reason: format!("{name} is not finite ({value})"),
                });
            }
        }
        if self.high < self.low {
            return Err(ConfluenceError::MalformedBar {
                index,
                reason: format!("high {} below low {}", self.high, self.low),
            });
        }
        if self.volume < 0.0 {
            return Err(ConfluenceError::MalformedBar {
                index,
                reason: format!("negative volume {}", self.volume),
            });
        }
        Ok(())
    }
}

/// (high + low + close) / 3
pub fn typical_price(high: f64, low: f64, close: f64) -> f64 {
    (high + low + close) / 3.0
}

/// max(high - low, |high - prev_close|, |low - prev_close|)
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}
