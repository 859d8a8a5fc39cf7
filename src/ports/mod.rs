//! Port traits: how the domain reaches bars, configuration and trade sinks.

pub mod config_port;
pub mod data_port;
pub mod report_port;
