//! Indicator suite and composite score.
//!
//! Nine voters in three families, equally weighted:
//!   trend    = SMA crossover + ADX + Parabolic SAR
//!   momentum = RSI + MACD + Williams %R
//!   volume   = VWAP deviation + CMF + OBV trend
//!   total    = (trend + momentum + volume) / 9, always within [-1, 1]

use super::indicator::{
    Adx, Atr, ChaikinMoneyFlow, Indicator, LiquidityGate, Macd, ObvTrend, ParabolicSar, Rsi,
    Sentiment, SmaCrossover, VwapDeviation, WilliamsR,
};
use super::window::RollingWindow;

const VOTERS: f64 = 9.0;

/// Periods and bands for every indicator in the suite.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// RSI, slow SMA, Williams %R and ADX lookback.
    pub window: usize,
    pub fast_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub atr_period: usize,
    pub sar_acceleration: f64,
    pub sar_maximum: f64,
    pub vwap_period: usize,
    pub cmf_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            rsi_overbought: 72.0,
            rsi_oversold: 30.0,
            window: 14,
            fast_window: 7,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 10,
            atr_period: 14,
            sar_acceleration: 0.02,
            sar_maximum: 0.2,
            vwap_period: 20,
            cmf_period: 20,
        }
    }
}

impl IndicatorSettings {
    /// Rolling window capacity: the longest lookback read from the window.
    /// ADX and ATR need one bar beyond their period for the previous close.
    /// VWAP and CMF keep their own buffers and only read the newest bar.
    pub fn window_capacity(&self) -> usize {
        (self.window + 1)
            .max(self.atr_period + 1)
            .max(self.macd_slow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScore {
    pub trend: f64,
    pub momentum: f64,
    pub volume: f64,
    pub total: f64,
}

impl CompositeScore {
    pub fn new(trend: [Sentiment; 3], momentum: [Sentiment; 3], volume: [Sentiment; 3]) -> Self {
        let sum = |votes: [Sentiment; 3]| votes.iter().map(|s| s.value()).sum::<f64>();
        let (trend, momentum, volume) = (sum(trend), sum(momentum), sum(volume));
        CompositeScore {
            trend,
            momentum,
            volume,
            total: (trend + momentum + volume) / VOTERS,
        }
    }
}

/// Everything one evaluation step produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorReadings {
    pub sma: Sentiment,
    pub adx: Sentiment,
    pub sar: Sentiment,
    pub rsi: Sentiment,
    pub macd: Sentiment,
    pub williams: Sentiment,
    pub vwap: Sentiment,
    pub cmf: Sentiment,
    pub obv: Sentiment,
    pub rsi_value: Option<f64>,
    pub atr: f64,
    pub liquid: bool,
    pub score: CompositeScore,
}

#[derive(Debug, Clone)]
pub struct IndicatorSuite {
    sma: SmaCrossover,
    adx: Adx,
    sar: ParabolicSar,
    rsi: Rsi,
    macd: Macd,
    williams: WilliamsR,
    vwap: VwapDeviation,
    cmf: ChaikinMoneyFlow,
    obv: ObvTrend,
    atr: Atr,
    liquidity: LiquidityGate,
}

impl IndicatorSuite {
    pub fn new(settings: &IndicatorSettings, liquidity_factor: f64) -> Self {
        IndicatorSuite {
            sma: SmaCrossover::new(settings.fast_window, settings.window),
            adx: Adx::new(settings.window),
            sar: ParabolicSar::new(settings.sar_acceleration, settings.sar_maximum),
            rsi: Rsi::new(settings.window, settings.rsi_overbought, settings.rsi_oversold),
            macd: Macd::new(settings.macd_fast, settings.macd_slow, settings.macd_signal),
            williams: WilliamsR::new(settings.window),
            vwap: VwapDeviation::new(settings.vwap_period),
            cmf: ChaikinMoneyFlow::new(settings.cmf_period),
            obv: ObvTrend::new(),
            atr: Atr::new(settings.atr_period),
            liquidity: LiquidityGate::new(liquidity_factor),
        }
    }

    /// Voter names in trend, momentum, volume order.
    pub fn voter_names(&self) -> [&'static str; 9] {
        [
            self.sma.name(),
            self.adx.name(),
            self.sar.name(),
            self.rsi.name(),
            self.macd.name(),
            self.williams.name(),
            self.vwap.name(),
            self.cmf.name(),
            self.obv.name(),
        ]
    }

    /// Step every indicator exactly once against `window`.
    pub fn evaluate(&mut self, window: &RollingWindow) -> IndicatorReadings {
        let atr = self.atr.update(window);
        let rsi = self.rsi.update(window);
        let sma = self.sma.update(window);
        let macd = self.macd.update(window);
        let williams = self.williams.update(window);
        let adx = self.adx.update(window);
        let obv = self.obv.update(window);
        let cmf = self.cmf.update(window);
        let vwap = self.vwap.update(window);
        let sar = self.sar.update(window);
        let liquid = self.liquidity.update(window);

        IndicatorReadings {
            sma,
            adx,
            sar,
            rsi,
            macd,
            williams,
            vwap,
            cmf,
            obv,
            rsi_value: self.rsi.value(),
            atr,
            liquid,
            score: CompositeScore::new([sma, adx, sar], [rsi, macd, williams], [vwap, cmf, obv]),
        }
    }
}
