//! Aggregate trade statistics.
//!
//! PnL is tracked in price units per unit traded; `lot_size` scales the net
//! result into account currency.

use std::collections::BTreeMap;

use super::position::{ClosedTrade, ExitReason};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub net_pnl: f64,
    pub net_pnl_lots: f64,
    pub exits: BTreeMap<&'static str, usize>,
}

impl Metrics {
    pub fn compute(trades: &[ClosedTrade], lot_size: f64) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut exits: BTreeMap<&'static str, usize> =
            ExitReason::ALL.iter().map(|r| (r.as_str(), 0)).collect();

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
            *exits.entry(trade.exit_reason.as_str()).or_default() += 1;
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let net_pnl: f64 = trades.iter().map(|t| t.pnl).sum();

        Metrics {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            net_pnl,
            net_pnl_lots: net_pnl * lot_size,
            exits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Side;
    use approx::assert_relative_eq;

    fn make_trade(pnl: f64, reason: ExitReason) -> ClosedTrade {
        ClosedTrade {
            side: Side::Long,
            entry_price: 1.0,
            exit_price: 1.0 + pnl,
            pnl,
            exit_reason: reason,
            entry_time: None,
            exit_time: None,
        }
    }

    #[test]
    fn metrics_no_trades() {
        let m = Metrics::compute(&[], 100_000.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.net_pnl_lots, 0.0);
        assert_eq!(m.exits.values().sum::<usize>(), 0);
        assert_eq!(m.exits.len(), 4);
    }

    #[test]
    fn metrics_wins_and_losses() {
        let trades = [
            make_trade(0.004, ExitReason::TakeProfit),
            make_trade(-0.002, ExitReason::StopLoss),
            make_trade(0.002, ExitReason::Signal),
            make_trade(0.0, ExitReason::EndOfData),
        ];
        let m = Metrics::compute(&trades, 100_000.0);
        assert_eq!(m.total_trades, 4);
        assert_eq!(m.trades_won, 2);
        assert_eq!(m.trades_lost, 1);
        assert_eq!(m.trades_breakeven, 1);
        assert_relative_eq!(m.win_rate, 0.5);
        assert_relative_eq!(m.avg_win, 0.003, epsilon = 1e-12);
        assert_relative_eq!(m.avg_loss, 0.002, epsilon = 1e-12);
        assert_relative_eq!(m.largest_win, 0.004);
        assert_relative_eq!(m.largest_loss, 0.002);
        assert_relative_eq!(m.profit_factor, 3.0, epsilon = 1e-9);
        assert_relative_eq!(m.net_pnl, 0.004, epsilon = 1e-12);
        assert_relative_eq!(m.net_pnl_lots, 400.0, epsilon = 1e-6);
        assert_eq!(m.exits["take-profit"], 1);
        assert_eq!(m.exits["end-of-data"], 1);
    }

    #[test]
    fn metrics_only_wins_has_infinite_profit_factor() {
        let m = Metrics::compute(&[make_trade(0.001, ExitReason::TakeProfit)], 1.0);
        assert!(m.profit_factor.is_infinite());
        assert_relative_eq!(m.win_rate, 1.0);
    }
}
