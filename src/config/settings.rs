//! Bot configuration settings and environment variable handling

use alloy::primitives::Address;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;

use crate::errors::{BotError, BotResult};
use crate::types::{MarketRoute, PoolIdentity, Token};

// Scenario classification constants
pub const DEFAULT_RICH_THRESHOLD: Decimal = dec!(1.01);
pub const DEFAULT_CHEAP_THRESHOLD: Decimal = dec!(0.99);
pub const DEFAULT_TOLERANCE_BAND_PCT: Decimal = dec!(1); // issuer revert band, ±1%
pub const HIGH_ORACLE_IMPACT_PCT: Decimal = dec!(2);
pub const SEVERE_OFFPEG_PCT: Decimal = dec!(3);

// Polling constants
pub const MIN_CHECK_INTERVAL_MS: u64 = 500;
pub const MAX_CHECK_INTERVAL_MS: u64 = 60_000;

// Execution constants
pub const MIN_PROFIT_USD_FLOOR: Decimal = dec!(0.01);
pub const MAX_SLIPPAGE_BPS: u32 = 100; // 1%
pub const DEFAULT_GAS_PRICE_GWEI: u32 = 50;
pub const MAX_GAS_PRICE_GWEI: u32 = 200;
pub const EXECUTION_TIMEOUT_SECS: u64 = 30;

// Per-hop gas estimates, summed into the simulation's gas verdict
pub const GAS_FLASHLOAN: u64 = 90_000;
pub const GAS_SWAP: u64 = 120_000;
pub const GAS_MINT: u64 = 110_000;
pub const GAS_REDEEM: u64 = 110_000;
pub const GAS_REPAY: u64 = 35_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub check_interval_ms: u64,
    pub rich_threshold: Decimal,
    pub cheap_threshold: Decimal,
    pub tolerance_band_pct: Decimal,
    pub min_profit_usd: Decimal,
    pub slippage_bps: u32,
    pub flashloan_fee_bps: u32,
    pub flashloan_amounts: Vec<Decimal>,
    pub oracle_cache_ttl_secs: u64,
    pub oracle_stale_secs: u64,
    // Execution configuration
    pub enable_execution: bool,
    pub max_gas_price_gwei: u32,
    pub private_key: Option<String>,
    pub rpc_url: Option<String>,
    pub native_usd_price: Option<Decimal>,
    // Resilience configuration
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
    // Market addresses
    pub base_token: Option<Address>,
    pub base_decimals: u8,
    pub intermediary_token: Option<Address>,
    pub intermediary_decimals: u8,
    pub synth_token: Option<Address>,
    pub synth_decimals: u8,
    pub pool_base_intermediary: Option<Address>,
    pub pool_intermediary_synth: Option<Address>,
    pub oracle_address: Option<Address>,
    pub issuer_address: Option<Address>,
    pub executor_address: Option<Address>,
}

fn env_address(key: &str) -> Option<Address> {
    env::var(key).ok().and_then(|s| Address::from_str(s.trim()).ok())
}

fn env_decimal(key: &str, default: Decimal) -> Decimal {
    env::var(key)
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(default)
}

impl Config {
    pub fn load() -> Self {
        Self {
            check_interval_ms: env::var("CHECK_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2000)
                .max(MIN_CHECK_INTERVAL_MS)
                .min(MAX_CHECK_INTERVAL_MS),
            rich_threshold: env_decimal("RICH_THRESHOLD", DEFAULT_RICH_THRESHOLD),
            cheap_threshold: env_decimal("CHEAP_THRESHOLD", DEFAULT_CHEAP_THRESHOLD),
            tolerance_band_pct: env_decimal("TOLERANCE_BAND_PCT", DEFAULT_TOLERANCE_BAND_PCT),
            min_profit_usd: env_decimal("MIN_PROFIT_USD", dec!(1.00))
                .max(MIN_PROFIT_USD_FLOOR),
            slippage_bps: env::var("SLIPPAGE_BPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5)
                .min(MAX_SLIPPAGE_BPS),
            flashloan_fee_bps: env::var("FLASHLOAN_FEE_BPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(9),
            flashloan_amounts: env::var("FLASHLOAN_AMOUNTS")
                .unwrap_or_else(|_| "1000,5000,10000,25000".to_string())
                .split(',')
                .filter_map(|s| Decimal::from_str(s.trim()).ok())
                .collect(),
            oracle_cache_ttl_secs: env::var("ORACLE_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            oracle_stale_secs: env::var("ORACLE_STALE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86_400),
            enable_execution: env::var("ENABLE_EXECUTION")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            max_gas_price_gwei: env::var("MAX_GAS_PRICE_GWEI")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_GAS_PRICE_GWEI)
                .min(MAX_GAS_PRICE_GWEI),
            private_key: env::var("PRIVATE_KEY").ok(),
            rpc_url: env::var("RPC_URL").ok(),
            native_usd_price: env::var("NATIVE_USD_PRICE")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok()),
            max_consecutive_errors: env::var("MAX_CONSECUTIVE_ERRORS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            circuit_breaker_cooldown_secs: 300, // 5 minutes
            base_token: env_address("BASE_TOKEN"),
            base_decimals: env::var("BASE_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
            intermediary_token: env_address("INTERMEDIARY_TOKEN"),
            intermediary_decimals: env::var("INTERMEDIARY_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(18),
            synth_token: env_address("SYNTH_TOKEN"),
            synth_decimals: env::var("SYNTH_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(18),
            pool_base_intermediary: env_address("POOL_BASE_INTERMEDIARY"),
            pool_intermediary_synth: env_address("POOL_INTERMEDIARY_SYNTH"),
            oracle_address: env_address("ORACLE_ADDRESS"),
            issuer_address: env_address("ISSUER_ADDRESS"),
            executor_address: env_address("EXECUTOR_ADDRESS"),
        }
    }

    /// Configuration-time validation. Failures here are fatal: the monitor
    /// must never start against a half-specified market.
    pub fn validate(&self) -> BotResult<()> {
        if self.cheap_threshold >= dec!(1.0) || self.rich_threshold <= dec!(1.0) {
            return Err(BotError::Config(format!(
                "scenario thresholds must straddle 1.0: cheap={} rich={}",
                self.cheap_threshold, self.rich_threshold
            )));
        }
        if self.tolerance_band_pct <= dec!(0) {
            return Err(BotError::Config(format!(
                "tolerance band must be positive, got {}%",
                self.tolerance_band_pct
            )));
        }
        if self.flashloan_amounts.is_empty()
            || self.flashloan_amounts.iter().any(|a| *a <= dec!(0))
        {
            return Err(BotError::Config(
                "FLASHLOAN_AMOUNTS must name at least one positive amount".to_string(),
            ));
        }
        for (key, value) in [
            ("BASE_TOKEN", self.base_token),
            ("INTERMEDIARY_TOKEN", self.intermediary_token),
            ("SYNTH_TOKEN", self.synth_token),
            ("POOL_BASE_INTERMEDIARY", self.pool_base_intermediary),
            ("POOL_INTERMEDIARY_SYNTH", self.pool_intermediary_synth),
            ("ORACLE_ADDRESS", self.oracle_address),
            ("ISSUER_ADDRESS", self.issuer_address),
        ] {
            if value.is_none() {
                return Err(BotError::Config(format!("{key} is missing or unparseable")));
            }
        }
        if self.enable_execution {
            if self.executor_address.is_none() {
                return Err(BotError::Config(
                    "EXECUTOR_ADDRESS is required when execution is enabled".to_string(),
                ));
            }
            if self.private_key.is_none() {
                return Err(BotError::Config(
                    "PRIVATE_KEY is required when execution is enabled".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Builds the market route (tokens, pools, venues) from validated config.
    pub fn route(&self) -> BotResult<MarketRoute> {
        self.validate()?;
        let base = Token {
            symbol: "BASE".to_string(),
            address: self.base_token.unwrap(),
            decimals: self.base_decimals,
        };
        let intermediary = Token {
            symbol: "INTER".to_string(),
            address: self.intermediary_token.unwrap(),
            decimals: self.intermediary_decimals,
        };
        let synth = Token {
            symbol: "SYNTH".to_string(),
            address: self.synth_token.unwrap(),
            decimals: self.synth_decimals,
        };
        Ok(MarketRoute {
            pool_base_intermediary: PoolIdentity {
                address: self.pool_base_intermediary.unwrap(),
                name: "base/intermediary".to_string(),
                tokens: [base.clone(), intermediary.clone()],
            },
            pool_intermediary_synth: PoolIdentity {
                address: self.pool_intermediary_synth.unwrap(),
                name: "intermediary/synth".to_string(),
                tokens: [intermediary.clone(), synth.clone()],
            },
            base,
            intermediary,
            synth,
            oracle: self.oracle_address.unwrap(),
            issuer: self.issuer_address.unwrap(),
        })
    }
}
