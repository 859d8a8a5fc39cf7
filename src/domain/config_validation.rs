//! Configuration validation.
//!
//! Validates every threshold before a session is built. Errors name the INI
//! section and key the value came from.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::ConfluenceError;
use crate::domain::execution::{EntrySettings, ExitSettings};
use crate::domain::score::IndicatorSettings;

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), ConfluenceError> {
    validate_indicators(&config.indicators)?;
    validate_entry(&config.entry)?;
    validate_exit(&config.exit)?;
    Ok(())
}

fn validate_indicators(s: &IndicatorSettings) -> Result<(), ConfluenceError> {
    const SECTION: &str = "indicators";
    for (key, value) in [
        ("window", s.window),
        ("fast_window", s.fast_window),
        ("macd_fast", s.macd_fast),
        ("macd_slow", s.macd_slow),
        ("macd_signal", s.macd_signal),
        ("atr_period", s.atr_period),
        ("vwap_period", s.vwap_period),
        ("cmf_period", s.cmf_period),
    ] {
        if value == 0 {
            return Err(ConfluenceError::invalid(SECTION, key, format!("{key} must be positive")));
        }
    }
    if s.window < 2 {
        return Err(ConfluenceError::invalid(SECTION, "window", "window must be at least 2"));
    }
    if s.fast_window >= s.window {
        return Err(ConfluenceError::invalid(
            SECTION,
            "fast_window",
            format!("fast_window ({}) must be less than window ({})", s.fast_window, s.window),
        ));
    }
    if s.macd_fast >= s.macd_slow {
        return Err(ConfluenceError::invalid(
            SECTION,
            "macd_fast",
            format!("macd_fast ({}) must be less than macd_slow ({})", s.macd_fast, s.macd_slow),
        ));
    }
    if !(0.0..=100.0).contains(&s.rsi_overbought) {
        return Err(ConfluenceError::invalid(
            SECTION,
            "rsi_overbought",
            "rsi_overbought must be between 0 and 100",
        ));
    }
    if !(s.rsi_oversold >= 0.0 && s.rsi_oversold < s.rsi_overbought) {
        return Err(ConfluenceError::invalid(
            SECTION,
            "rsi_oversold",
            "rsi_oversold must be non-negative and below rsi_overbought",
        ));
    }
    if !(s.sar_acceleration > 0.0 && s.sar_acceleration <= s.sar_maximum) {
        return Err(ConfluenceError::invalid(
            SECTION,
            "sar_acceleration",
            "sar_acceleration must be positive and at most sar_maximum",
        ));
    }
    Ok(())
}

fn validate_entry(s: &EntrySettings) -> Result<(), ConfluenceError> {
    const SECTION: &str = "entry";
    if !(s.score_threshold > 0.0 && s.score_threshold <= 1.0) {
        return Err(ConfluenceError::invalid(
            SECTION,
            "score_threshold",
            "score_threshold must be in (0, 1]",
        ));
    }
    if !(s.min_atr >= 0.0 && s.min_atr < s.max_atr) {
        return Err(ConfluenceError::invalid(
            SECTION,
            "min_atr",
            format!("min_atr ({}) must be non-negative and below max_atr ({})", s.min_atr, s.max_atr),
        ));
    }
    non_negative(SECTION, "price_reversal", s.price_reversal)?;
    non_negative(SECTION, "entry_adjustment", s.entry_adjustment)?;
    positive(SECTION, "liquidity_factor", s.liquidity_factor)?;
    Ok(())
}

fn validate_exit(s: &ExitSettings) -> Result<(), ConfluenceError> {
    const SECTION: &str = "exit";
    positive(SECTION, "tp_atr_multiplier", s.tp_atr_multiplier)?;
    positive(SECTION, "sl_atr_multiplier", s.sl_atr_multiplier)?;
    non_negative(SECTION, "fee", s.fee)?;
    Ok(())
}

fn positive(section: &str, key: &str, value: f64) -> Result<(), ConfluenceError> {
    // NaN fails the comparison and is rejected too
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfluenceError::invalid(section, key, format!("{key} must be positive")))
    }
}

fn non_negative(section: &str, key: &str, value: f64) -> Result<(), ConfluenceError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfluenceError::invalid(section, key, format!("{key} must be non-negative")))
    }
}
