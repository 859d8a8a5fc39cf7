//! Position state machine: arming, pullback confirmation and bracket exits.
//!
//! Each evaluated bar runs, in order:
//! 1. exit checks for an open position (take-profit, stop-loss, adverse score)
//! 2. decay of an armed intent whose score no longer clears the threshold
//! 3. arming from flat when score, ATR band, liquidity and RSI/Williams agree
//! 4. confirmation of an armed intent once price pulls back past the reference
//!
//! A position closed in step 1 leaves the machine flat, so step 3 may arm a
//! new intent on the same bar. Arming and confirmation never share a bar.

use chrono::NaiveDateTime;

use super::ohlcv::OhlcvBar;
use super::position::{ClosedTrade, ExitReason, Position, Side};
use super::score::IndicatorReadings;

/// Arming and fill parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySettings {
    pub score_threshold: f64,
    pub min_atr: f64,
    pub max_atr: f64,
    /// Pullback beyond the reference price required to confirm an entry.
    pub price_reversal: f64,
    /// Slippage added to (long) or taken from (short) the fill price.
    pub entry_adjustment: f64,
    pub liquidity_factor: f64,
}

impl Default for EntrySettings {
    fn default() -> Self {
        EntrySettings {
            score_threshold: 0.2,
            min_atr: 0.0003,
            max_atr: 0.002,
            price_reversal: 0.0001,
            entry_adjustment: 0.00008,
            liquidity_factor: 1.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitSettings {
    pub tp_atr_multiplier: f64,
    pub sl_atr_multiplier: f64,
    pub fee: f64,
}

impl Default for ExitSettings {
    fn default() -> Self {
        ExitSettings {
            tp_atr_multiplier: 4.0,
            sl_atr_multiplier: 2.0,
            fee: 0.00008,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    ArmedLong {
        reference: f64,
    },
    ArmedShort {
        reference: f64,
    },
    Long(Position),
    Short(Position),
}

impl PositionState {
    pub fn position(&self) -> Option<(Side, &Position)> {
        match self {
            PositionState::Long(p) => Some((Side::Long, p)),
            PositionState::Short(p) => Some((Side::Short, p)),
            _ => None,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    Armed { side: Side, reference: f64 },
    Cancelled { side: Side, reference: f64 },
    Entered { side: Side, position: Position },
    Exited(ClosedTrade),
}

#[derive(Debug, Clone)]
pub struct PositionMachine {
    entry: EntrySettings,
    exit: ExitSettings,
    state: PositionState,
}

impl PositionMachine {
    pub fn new(entry: EntrySettings, exit: ExitSettings) -> Self {
        PositionMachine {
            entry,
            exit,
            state: PositionState::Flat,
        }
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Advance the machine by one evaluated bar.
    pub fn step(&mut self, bar: &OhlcvBar, readings: &IndicatorReadings) -> Vec<MachineEvent> {
        let mut events = Vec::new();
        let close = bar.close;
        let score = readings.score.total;
        let threshold = self.entry.score_threshold;

        if let Some((side, position)) = self.state.position() {
            if let Some(reason) = self.exit_reason(side, position, close, score) {
                let trade = close_trade(side, position, close, bar.time, reason, self.exit.fee);
                events.push(MachineEvent::Exited(trade));
                self.state = PositionState::Flat;
            }
        }

        match self.state {
            PositionState::ArmedLong { reference } if score < threshold => {
                events.push(MachineEvent::Cancelled {
                    side: Side::Long,
                    reference,
                });
                self.state = PositionState::Flat;
            }
            PositionState::ArmedShort { reference } if score > -threshold => {
                events.push(MachineEvent::Cancelled {
                    side: Side::Short,
                    reference,
                });
                self.state = PositionState::Flat;
            }
            _ => {}
        }

        match self.state {
            PositionState::Flat => {
                if let Some(side) = self.arming_side(readings) {
                    self.state = match side {
                        Side::Long => PositionState::ArmedLong { reference: close },
                        Side::Short => PositionState::ArmedShort { reference: close },
                    };
                    events.push(MachineEvent::Armed {
                        side,
                        reference: close,
                    });
                }
            }
            PositionState::ArmedLong { reference } => {
                if close < reference - self.entry.price_reversal {
                    let entry = close + self.entry.entry_adjustment;
                    let position = self.open(Side::Long, entry, readings.atr, bar.time);
                    self.state = PositionState::Long(position);
                    events.push(MachineEvent::Entered {
                        side: Side::Long,
                        position,
                    });
                }
            }
            PositionState::ArmedShort { reference } => {
                if close > reference + self.entry.price_reversal {
                    let entry = close - self.entry.entry_adjustment;
                    let position = self.open(Side::Short, entry, readings.atr, bar.time);
                    self.state = PositionState::Short(position);
                    events.push(MachineEvent::Entered {
                        side: Side::Short,
                        position,
                    });
                }
            }
            PositionState::Long(_) | PositionState::Short(_) => {}
        }

        events
    }

    /// Close any open position at `close` without a fee and drop any armed
    /// intent. Used once the data is exhausted.
    pub fn liquidate(&mut self, close: f64, time: Option<NaiveDateTime>) -> Option<ClosedTrade> {
        let trade = self
            .state
            .position()
            .map(|(side, position)| close_trade(side, position, close, time, ExitReason::EndOfData, 0.0));
        self.state = PositionState::Flat;
        trade
    }

    fn exit_reason(&self, side: Side, position: &Position, close: f64, score: f64) -> Option<ExitReason> {
        let threshold = self.entry.score_threshold;
        let adverse = match side {
            Side::Long => score <= -threshold,
            Side::Short => score >= threshold,
        };
        if position.should_take_profit(side, close) {
            Some(ExitReason::TakeProfit)
        } else if position.should_stop_loss(side, close) {
            Some(ExitReason::StopLoss)
        } else if adverse {
            Some(ExitReason::Signal)
        } else {
            None
        }
    }

    fn arming_side(&self, readings: &IndicatorReadings) -> Option<Side> {
        let threshold = self.entry.score_threshold;
        let score = readings.score.total;
        let tradable = self.entry.min_atr < readings.atr
            && readings.atr < self.entry.max_atr
            && readings.liquid;
        if !tradable {
            return None;
        }
        let (rsi, williams) = (readings.rsi.value(), readings.williams.value());
        if score >= threshold && (rsi >= threshold || williams >= threshold) {
            Some(Side::Long)
        } else if score <= -threshold && (rsi <= -threshold || williams <= -threshold) {
            Some(Side::Short)
        } else {
            None
        }
    }

    fn open(&self, side: Side, entry: f64, atr: f64, time: Option<NaiveDateTime>) -> Position {
        Position::open(
            side,
            entry,
            atr,
            self.exit.tp_atr_multiplier,
            self.exit.sl_atr_multiplier,
            time,
        )
    }
}

fn close_trade(
    side: Side,
    position: &Position,
    close: f64,
    time: Option<NaiveDateTime>,
    reason: ExitReason,
    fee: f64,
) -> ClosedTrade {
    ClosedTrade {
        side,
        entry_price: position.entry_price,
        exit_price: close,
        pnl: position.gross_pnl(side, close) - fee,
        exit_reason: reason,
        entry_time: position.entry_time,
        exit_time: time,
    }
}
