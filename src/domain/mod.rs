//! Core domain types and logic: rolling window, streaming indicators,
//! composite score, position state machine and the backtest session.

pub mod ohlcv;
pub mod window;
pub mod indicator;
pub mod score;
pub mod position;
pub mod execution;
pub mod backtest;
pub mod config_validation;
pub mod metrics;
pub mod error;
