//! Bar source port.

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::OhlcvBar;

/// A forward-only stream of bars in chronological order.
pub trait BarSource {
    /// Next bar, or `None` once the data is exhausted.
    fn next_bar(&mut self) -> Result<Option<OhlcvBar>, ConfluenceError>;
}
