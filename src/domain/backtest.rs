//! Backtest session: the per-bar event loop.
//!
//! Each bar is validated, pushed into the rolling window and, once the window
//! is full, run through the indicator suite and the position machine. Bars
//! that arrive while the window is still filling only prime the history.

use tracing::{debug, info, trace, warn};

use super::config_validation::validate_backtest_config;
use super::error::ConfluenceError;
use super::execution::{EntrySettings, ExitSettings, MachineEvent, PositionMachine, PositionState};
use super::ohlcv::OhlcvBar;
use super::position::ClosedTrade;
use super::score::{IndicatorReadings, IndicatorSettings, IndicatorSuite};
use super::window::RollingWindow;
use crate::ports::data_port::BarSource;
use crate::ports::report_port::TradeSink;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestConfig {
    pub indicators: IndicatorSettings,
    pub entry: EntrySettings,
    pub exit: ExitSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<ClosedTrade>,
    pub bars_seen: usize,
    pub steps_evaluated: usize,
}

pub struct BacktestSession {
    window: RollingWindow,
    suite: IndicatorSuite,
    machine: PositionMachine,
    trades: Vec<ClosedTrade>,
    last_bar: Option<OhlcvBar>,
    last_readings: Option<IndicatorReadings>,
    bars_seen: usize,
    steps_evaluated: usize,
}

impl BacktestSession {
    pub fn new(config: BacktestConfig) -> Result<Self, ConfluenceError> {
        validate_backtest_config(&config)?;
        let BacktestConfig {
            indicators,
            entry,
            exit,
        } = config;
        let suite = IndicatorSuite::new(&indicators, entry.liquidity_factor);
        debug!(
            capacity = indicators.window_capacity(),
            voters = ?suite.voter_names(),
            "session configured"
        );
        Ok(BacktestSession {
            window: RollingWindow::new(indicators.window_capacity()),
            suite,
            machine: PositionMachine::new(entry, exit),
            trades: Vec::new(),
            last_bar: None,
            last_readings: None,
            bars_seen: 0,
            steps_evaluated: 0,
        })
    }

    pub fn state(&self) -> &PositionState {
        self.machine.state()
    }

    pub fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// Feed one bar. Returns the readings when the bar was evaluated, `None`
    /// while priming. A malformed bar aborts with [`ConfluenceError::MalformedBar`].
    pub fn step(&mut self, bar: OhlcvBar) -> Result<Option<IndicatorReadings>, ConfluenceError> {
        bar.validate(self.bars_seen)?;
        self.bars_seen += 1;
        self.window.push(&bar);

        if !self.window.is_full() {
            trace!(
                filled = self.window.len(),
                capacity = self.window.capacity(),
                "priming window"
            );
            self.last_bar = Some(bar);
            return Ok(None);
        }

        let readings = self.suite.evaluate(&self.window);
        self.steps_evaluated += 1;
        trace!(
            step = self.steps_evaluated,
            close = bar.close,
            score = readings.score.total,
            trend = readings.score.trend,
            momentum = readings.score.momentum,
            volume = readings.score.volume,
            atr = readings.atr,
            rsi = ?readings.rsi_value,
            liquid = readings.liquid,
            "evaluated bar"
        );

        for event in self.machine.step(&bar, &readings) {
            self.log_event(&event, &readings);
            if let MachineEvent::Exited(trade) = event {
                self.trades.push(trade);
            }
        }
        self.last_bar = Some(bar);
        self.last_readings = Some(readings);
        Ok(Some(readings))
    }

    /// Force-close any open position at the last close. Idempotent.
    pub fn liquidate(&mut self) -> Option<ClosedTrade> {
        let bar = self.last_bar.as_ref()?;
        let trade = self.machine.liquidate(bar.close, bar.time)?;
        // an open position implies at least one evaluated bar
        if let Some(readings) = &self.last_readings {
            log_closed(&trade, readings);
        }
        self.trades.push(trade.clone());
        Some(trade)
    }

    pub fn finish(mut self) -> BacktestResult {
        self.liquidate();
        if self.steps_evaluated == 0 {
            warn!(
                bars = self.bars_seen,
                capacity = self.window.capacity(),
                "rolling window never filled; no bar was evaluated"
            );
        }
        BacktestResult {
            trades: self.trades,
            bars_seen: self.bars_seen,
            steps_evaluated: self.steps_evaluated,
        }
    }

    fn log_event(&self, event: &MachineEvent, readings: &IndicatorReadings) {
        match event {
            MachineEvent::Armed { side, reference } => debug!(
                %side,
                reference,
                score = readings.score.total,
                atr = readings.atr,
                "entry intent armed"
            ),
            MachineEvent::Cancelled { side, reference } => debug!(
                %side,
                reference,
                score = readings.score.total,
                "entry intent cancelled"
            ),
            MachineEvent::Entered { side, position } => info!(
                %side,
                entry = position.entry_price,
                take_profit = position.take_profit,
                stop_loss = position.stop_loss,
                atr = readings.atr,
                score = readings.score.total,
                sma = %readings.sma,
                adx = %readings.adx,
                sar = %readings.sar,
                rsi = %readings.rsi,
                macd = %readings.macd,
                williams = %readings.williams,
                vwap = %readings.vwap,
                cmf = %readings.cmf,
                obv = %readings.obv,
                "position opened"
            ),
            MachineEvent::Exited(trade) => log_closed(trade, readings),
        }
    }
}

/// Exit event with the votes of the bar that closed the position.
fn log_closed(trade: &ClosedTrade, readings: &IndicatorReadings) {
    info!(
        side = %trade.side,
        reason = %trade.exit_reason,
        entry = trade.entry_price,
        exit = trade.exit_price,
        pnl = trade.pnl,
        score = readings.score.total,
        sma = %readings.sma,
        adx = %readings.adx,
        sar = %readings.sar,
        rsi = %readings.rsi,
        macd = %readings.macd,
        williams = %readings.williams,
        vwap = %readings.vwap,
        cmf = %readings.cmf,
        obv = %readings.obv,
        "position closed"
    );
}

/// Drive `source` to exhaustion, forwarding every closed trade to `sink`.
pub fn run_backtest(
    source: &mut dyn BarSource,
    config: BacktestConfig,
    sink: &mut dyn TradeSink,
) -> Result<BacktestResult, ConfluenceError> {
    let mut session = BacktestSession::new(config)?;
    if let Err(err) = drain_into(source, &mut session, sink) {
        // keep what was already recorded before surfacing the failure
        if let Err(flush_err) = sink.flush() {
            warn!(error = %flush_err, "trade sink flush failed after aborted run");
        }
        return Err(err);
    }
    sink.flush()?;

    let result = session.finish();
    info!(
        bars = result.bars_seen,
        steps = result.steps_evaluated,
        trades = result.trades.len(),
        "backtest complete"
    );
    Ok(result)
}

fn drain_into(
    source: &mut dyn BarSource,
    session: &mut BacktestSession,
    sink: &mut dyn TradeSink,
) -> Result<(), ConfluenceError> {
    let mut recorded = 0;
    while let Some(bar) = source.next_bar()? {
        session.step(bar)?;
        for trade in &session.trades()[recorded..] {
            sink.record(trade)?;
        }
        recorded = session.trades().len();
    }
    if let Some(trade) = session.liquidate() {
        sink.record(&trade)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BacktestConfig {
        let mut config = BacktestConfig::default();
        config.indicators.macd_slow = 15;
        config
    }

    fn flat_bar() -> OhlcvBar {
        OhlcvBar::new(1.1, 1.1005, 1.0995, 1.1, 1000.0)
    }

    #[test]
    fn defaults_mirror_settings() {
        let c = BacktestConfig::default();
        assert_eq!(c.indicators.window, 14);
        assert_eq!(c.indicators.macd_slow, 26);
        assert!((c.entry.score_threshold - 0.2).abs() < f64::EPSILON);
        assert!((c.exit.fee - 0.00008).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut config = BacktestConfig::default();
        config.indicators.fast_window = 20;
        assert!(matches!(
            BacktestSession::new(config),
            Err(ConfluenceError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn priming_bars_are_not_evaluated() {
        let mut session = BacktestSession::new(small_config()).unwrap();
        for _ in 0..14 {
            assert!(session.step(flat_bar()).unwrap().is_none());
        }
        assert!(session.step(flat_bar()).unwrap().is_some());
        let result = session.finish();
        assert_eq!(result.bars_seen, 15);
        assert_eq!(result.steps_evaluated, 1);
    }

    #[test]
    fn malformed_bar_aborts() {
        let mut session = BacktestSession::new(small_config()).unwrap();
        session.step(flat_bar()).unwrap();
        let err = session
            .step(OhlcvBar::new(1.1, 1.0, 1.2, 1.1, 10.0))
            .unwrap_err();
        assert!(matches!(err, ConfluenceError::MalformedBar { index: 1, .. }));
    }

    #[test]
    fn nan_close_aborts() {
        let mut session = BacktestSession::new(small_config()).unwrap();
        let err = session
            .step(OhlcvBar::new(1.1, 1.2, 1.0, f64::NAN, 10.0))
            .unwrap_err();
        assert!(matches!(err, ConfluenceError::MalformedBar { index: 0, .. }));
    }

    #[test]
    fn short_series_finishes_without_trades() {
        let mut session = BacktestSession::new(BacktestConfig::default()).unwrap();
        for _ in 0..5 {
            session.step(flat_bar()).unwrap();
        }
        let result = session.finish();
        assert!(result.trades.is_empty());
        assert_eq!(result.steps_evaluated, 0);
    }

    #[test]
    fn run_backtest_forwards_trades_to_sink() {
        struct Bars(std::vec::IntoIter<OhlcvBar>);
        impl BarSource for Bars {
            fn next_bar(&mut self) -> Result<Option<OhlcvBar>, ConfluenceError> {
                Ok(self.0.next())
            }
        }

        let bars: Vec<OhlcvBar> = (0..40).map(|_| flat_bar()).collect();
        let mut source = Bars(bars.into_iter());
        let mut sink: Vec<ClosedTrade> = Vec::new();
        let result = run_backtest(&mut source, small_config(), &mut sink).unwrap();
        assert_eq!(result.bars_seen, 40);
        assert_eq!(result.steps_evaluated, 26);
        assert_eq!(sink, result.trades);
        // constant volume never opens the liquidity gate
        assert!(sink.is_empty());
    }
}
