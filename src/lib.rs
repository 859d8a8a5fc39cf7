//! confluence: multi-indicator confluence backtester.
//!
//! Hexagonal architecture: the streaming indicator engine, composite scorer
//! and position state machine live in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
