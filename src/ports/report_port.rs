//! Trade record sink port.

use crate::domain::error::ConfluenceError;
use crate::domain::position::ClosedTrade;

/// Receives every closed trade, in order, as the session produces it.
pub trait TradeSink {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), ConfluenceError>;

    fn flush(&mut self) -> Result<(), ConfluenceError> {
        Ok(())
    }
}

impl TradeSink for Vec<ClosedTrade> {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), ConfluenceError> {
        self.push(trade.clone());
        Ok(())
    }
}
