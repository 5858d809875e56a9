//! SynthUSD Peg Arbitrage Bot
//!
//! Monitors the SynthUSD intermediary pools for peg deviations against the
//! oracle-priced issuer, simulates flashloan-financed mint/redeem round trips
//! off-chain, and submits the profitable ones through a simulate-before-send
//! execution pipeline.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod pools;
pub mod oracle;
pub mod issuer;
pub mod monitor;
pub mod simulator;
pub mod execution;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{BotError, BotResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
