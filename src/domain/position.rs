//! Open positions and closed trade records.

use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Signal,
    EndOfData,
}

impl ExitReason {
    pub const ALL: [ExitReason; 4] = [
        ExitReason::TakeProfit,
        ExitReason::StopLoss,
        ExitReason::Signal,
        ExitReason::EndOfData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take-profit",
            ExitReason::StopLoss => "stop-loss",
            ExitReason::Signal => "signal",
            ExitReason::EndOfData => "end-of-data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bracket prices of an open position. The side is carried by the state
/// holding it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub entry_time: Option<NaiveDateTime>,
}

impl Position {
    /// Bracket around `entry_price`, `atr * multiplier` away on each side.
    pub fn open(
        side: Side,
        entry_price: f64,
        atr: f64,
        tp_multiplier: f64,
        sl_multiplier: f64,
        entry_time: Option<NaiveDateTime>,
    ) -> Self {
        let (take_profit, stop_loss) = match side {
            Side::Long => (entry_price + atr * tp_multiplier, entry_price - atr * sl_multiplier),
            Side::Short => (entry_price - atr * tp_multiplier, entry_price + atr * sl_multiplier),
        };
        Position {
            entry_price,
            take_profit,
            stop_loss,
            entry_time,
        }
    }

    pub fn should_take_profit(&self, side: Side, price: f64) -> bool {
        match side {
            Side::Long => price >= self.take_profit,
            Side::Short => price <= self.take_profit,
        }
    }

    pub fn should_stop_loss(&self, side: Side, price: f64) -> bool {
        match side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    /// Price move in the position's favour, before fees.
    pub fn gross_pnl(&self, side: Side, price: f64) -> f64 {
        match side {
            Side::Long => price - self.entry_price,
            Side::Short => self.entry_price - price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
    pub entry_time: Option<NaiveDateTime>,
    pub exit_time: Option<NaiveDateTime>,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}
