//! Custom error types for the bot

use alloy::primitives::Address;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pool mismatch: {pool} coin {index} is {actual}, expected {expected}")]
    PoolMismatch {
        pool: Address,
        index: u8,
        expected: Address,
        actual: Address,
    },

    #[error("Token {token} is not a coin of pool {pool}")]
    UnknownTokenInPool {
        pool: Address,
        token: Address,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Quote failed on {venue} ({hop}): {reason}")]
    QuoteFailed {
        venue: String,
        hop: String,
        reason: String,
    },

    #[error("Oracle read failed for {oracle}: {reason}")]
    OracleRead {
        oracle: Address,
        reason: String,
    },

    #[error("Simulation aborted at hop '{hop}': {source}")]
    Simulation {
        hop: String,
        #[source]
        source: Box<BotError>,
    },

    #[error("Thin margin, attempt rejected: {details}")]
    ThinMargin {
        details: String,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Circuit breaker active: {reason}")]
    CircuitBreakerOpen {
        reason: String,
        cooldown_remaining: Duration,
    },
}

impl BotError {
    /// Wraps a hop failure so a partial simulation is never surfaced.
    pub fn at_hop(hop: &str, source: BotError) -> Self {
        BotError::Simulation {
            hop: hop.to_string(),
            source: Box::new(source),
        }
    }

    /// Stable key for error-count bookkeeping.
    pub fn category(&self) -> &'static str {
        match self {
            BotError::Config(_) => "config",
            BotError::PoolMismatch { .. } => "pool_mismatch",
            BotError::UnknownTokenInPool { .. } => "unknown_token",
            BotError::Network { .. } => "network",
            BotError::QuoteFailed { .. } => "quote_failed",
            BotError::OracleRead { .. } => "oracle_read",
            BotError::Simulation { .. } => "simulation",
            BotError::ThinMargin { .. } => "thin_margin",
            BotError::DataParsing { .. } => "data_parsing",
            BotError::CircuitBreakerOpen { .. } => "circuit_breaker",
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
