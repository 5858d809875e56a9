//! Shared fixtures and in-memory venue fakes for unit tests

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::errors::{BotError, BotResult};
use crate::execution::{Relay, ResolutionHandle};
use crate::issuer::IssuerVenue;
use crate::network::GasContext;
use crate::oracle::{OracleRound, OracleVenue};
use crate::pools::PoolVenue;
use crate::types::{
    ArbitrageScenario, MarketRoute, PrecheckOutcome, ProfitSimulation, Resolution,
    SimulationStep, StepKind,
};
use crate::utils::amount::{from_raw, to_raw};

pub fn config_fixture() -> Config {
    Config {
        check_interval_ms: 2000,
        rich_threshold: dec!(1.01),
        cheap_threshold: dec!(0.99),
        tolerance_band_pct: dec!(1),
        min_profit_usd: dec!(1),
        slippage_bps: 5,
        flashloan_fee_bps: 9,
        flashloan_amounts: vec![dec!(1000)],
        oracle_cache_ttl_secs: 60,
        oracle_stale_secs: 86_400,
        enable_execution: false,
        max_gas_price_gwei: 50,
        private_key: None,
        rpc_url: None,
        native_usd_price: None,
        max_consecutive_errors: 5,
        circuit_breaker_cooldown_secs: 300,
        base_token: Some(Address::repeat_byte(0x11)),
        base_decimals: 6,
        intermediary_token: Some(Address::repeat_byte(0x22)),
        intermediary_decimals: 18,
        synth_token: Some(Address::repeat_byte(0x33)),
        synth_decimals: 18,
        pool_base_intermediary: Some(Address::repeat_byte(0x44)),
        pool_intermediary_synth: Some(Address::repeat_byte(0x55)),
        oracle_address: Some(Address::repeat_byte(0x66)),
        issuer_address: Some(Address::repeat_byte(0x77)),
        executor_address: None,
    }
}

pub fn route_fixture() -> MarketRoute {
    config_fixture().route().unwrap()
}

pub fn gas_fixture() -> GasContext {
    GasContext {
        gas_price_wei: 1_000_000_000, // 1 gwei
        native_usd: dec!(2500),
    }
}

/// Hand-built simulation with the standard five-step shape and the given
/// intermediate hop outputs. Gas is zeroed so profit assertions stay exact.
pub fn simulation_fixture(
    scenario: ArbitrageScenario,
    flashloan_amount: Decimal,
    hop_outs: [Decimal; 3],
) -> ProfitSimulation {
    let fee = flashloan_amount * dec!(0.0009);
    let owed = flashloan_amount + fee;
    let recovered = hop_outs[2];
    let net = recovered - owed;

    let hop_shape: [(&str, StepKind, &str, &str); 3] = match scenario {
        ArbitrageScenario::Cheap => [
            ("issuer", StepKind::Mint, "BASE", "SYNTH"),
            ("intermediary/synth", StepKind::Swap, "SYNTH", "INTER"),
            ("base/intermediary", StepKind::Swap, "INTER", "BASE"),
        ],
        _ => [
            ("base/intermediary", StepKind::Swap, "BASE", "INTER"),
            ("intermediary/synth", StepKind::Swap, "INTER", "SYNTH"),
            ("issuer", StepKind::Redeem, "SYNTH", "BASE"),
        ],
    };

    let mut steps = vec![SimulationStep {
        ordinal: 0,
        kind: StepKind::Flashloan,
        token_in: "BASE".to_string(),
        amount_in: flashloan_amount,
        token_out: "BASE".to_string(),
        amount_out: flashloan_amount,
        rate: dec!(1),
        fee_bps: 9,
        fee_amount: fee,
        oracle_impact: None,
        venue: "flashloan".to_string(),
        gas_estimate: 90_000,
    }];
    let mut amount_in = flashloan_amount;
    for (i, (venue, kind, token_in, token_out)) in hop_shape.iter().enumerate() {
        steps.push(SimulationStep {
            ordinal: (i + 1) as u32,
            kind: *kind,
            token_in: token_in.to_string(),
            amount_in,
            token_out: token_out.to_string(),
            amount_out: hop_outs[i],
            rate: if amount_in > dec!(0) { hop_outs[i] / amount_in } else { dec!(0) },
            fee_bps: 0,
            fee_amount: dec!(0),
            oracle_impact: None,
            venue: venue.to_string(),
            gas_estimate: 110_000,
        });
        amount_in = hop_outs[i];
    }
    steps.push(SimulationStep {
        ordinal: 4,
        kind: StepKind::Repay,
        token_in: "BASE".to_string(),
        amount_in: recovered,
        token_out: "BASE".to_string(),
        amount_out: recovered - owed,
        rate: dec!(0),
        fee_bps: 0,
        fee_amount: dec!(0),
        oracle_impact: None,
        venue: "flashloan".to_string(),
        gas_estimate: 35_000,
    });

    ProfitSimulation {
        id: "sim-fixture".to_string(),
        timestamp: Utc::now(),
        scenario,
        flashloan_amount,
        steps,
        total_owed: owed,
        total_recovered: recovered,
        gross_profit: net,
        gas_cost_native: dec!(0),
        gas_cost_usd: dec!(0),
        net_profit_usd: net,
        is_profitable: net > dec!(1),
        would_revert: false,
        recommendation: String::new(),
        warnings: Vec::new(),
    }
}

/// Pool venue fake with per-direction exchange rates. Setters take `&self`
/// so state can change after the venue is shared behind an `Arc`.
pub struct MockPoolVenue {
    coins: RwLock<HashMap<(Address, u8), Address>>,
    decimals: RwLock<HashMap<Address, u32>>,
    rates: RwLock<HashMap<(Address, u8, u8), Decimal>>,
}

impl MockPoolVenue {
    /// Registers both pools of the route with unit rates in both
    /// directions.
    pub fn for_route(route: &MarketRoute) -> Self {
        let venue = Self {
            coins: RwLock::new(HashMap::new()),
            decimals: RwLock::new(HashMap::new()),
            rates: RwLock::new(HashMap::new()),
        };
        for pool in [&route.pool_base_intermediary, &route.pool_intermediary_synth] {
            for (index, token) in pool.tokens.iter().enumerate() {
                venue.set_coin(pool.address, index as u8, token.address);
                venue.decimals.write().unwrap().insert(token.address, token.decimals as u32);
            }
            venue.set_rate(pool.address, dec!(1));
        }
        venue
    }

    pub fn set_coin(&self, pool: Address, index: u8, coin: Address) {
        self.coins.write().unwrap().insert((pool, index), coin);
    }

    /// Sets the same multiplier for both swap directions of the pool.
    pub fn set_rate(&self, pool: Address, rate: Decimal) {
        self.set_rate_dir(pool, 0, 1, rate);
        self.set_rate_dir(pool, 1, 0, rate);
    }

    pub fn set_rate_dir(&self, pool: Address, i: u8, j: u8, rate: Decimal) {
        self.rates.write().unwrap().insert((pool, i, j), rate);
    }
}

#[async_trait]
impl PoolVenue for MockPoolVenue {
    async fn coin_at(&self, pool: Address, index: u8) -> BotResult<Address> {
        self.coins
            .read()
            .unwrap()
            .get(&(pool, index))
            .copied()
            .ok_or_else(|| BotError::Config(format!("no coin {index} registered for {pool}")))
    }

    async fn get_dy(&self, pool: Address, i: u8, j: u8, dx: U256) -> BotResult<U256> {
        let (coin_in, coin_out) = {
            let coins = self.coins.read().unwrap();
            (
                coins.get(&(pool, i)).copied(),
                coins.get(&(pool, j)).copied(),
            )
        };
        let decimals = self.decimals.read().unwrap();
        let dec_in = coin_in.and_then(|c| decimals.get(&c).copied()).unwrap_or(18);
        let dec_out = coin_out.and_then(|c| decimals.get(&c).copied()).unwrap_or(18);
        let rate = self
            .rates
            .read()
            .unwrap()
            .get(&(pool, i, j))
            .copied()
            .unwrap_or(dec!(1));

        let amount_in = from_raw(dx, dec_in)?;
        let amount_out = (amount_in * rate).trunc_with_scale(dec_out);
        to_raw(amount_out, dec_out)
    }
}

/// Oracle fake reporting a fixed price at 8 feed decimals.
pub struct MockOracleVenue {
    price: Mutex<Decimal>,
    updated_at: Mutex<i64>,
}

impl MockOracleVenue {
    pub fn new(price: Decimal) -> Self {
        Self {
            price: Mutex::new(price),
            updated_at: Mutex::new(Utc::now().timestamp()),
        }
    }

    pub fn set_price(&self, price: Decimal) {
        *self.price.lock().unwrap() = price;
    }

    pub fn set_updated_at(&self, timestamp: i64) {
        *self.updated_at.lock().unwrap() = timestamp;
    }
}

#[async_trait]
impl OracleVenue for MockOracleVenue {
    async fn latest_round(&self, _oracle: Address) -> BotResult<OracleRound> {
        let price = *self.price.lock().unwrap();
        Ok(OracleRound {
            round_id: 1,
            answer: to_raw(price, 8)?,
            updated_at: *self.updated_at.lock().unwrap() as u64,
        })
    }

    async fn decimals(&self, _oracle: Address) -> BotResult<u8> {
        Ok(8)
    }
}

pub struct MockIssuerVenue {
    mint_bps: u32,
    redeem_bps: u32,
}

impl MockIssuerVenue {
    pub fn new(mint_bps: u32, redeem_bps: u32) -> Self {
        Self { mint_bps, redeem_bps }
    }
}

#[async_trait]
impl IssuerVenue for MockIssuerVenue {
    async fn mint_fee_bps(&self) -> BotResult<u32> {
        Ok(self.mint_bps)
    }

    async fn redeem_fee_bps(&self) -> BotResult<u32> {
        Ok(self.redeem_bps)
    }
}

/// Relay fake with scripted precheck and resolution outcomes.
pub struct MockRelay {
    precheck: Mutex<PrecheckOutcome>,
    resolution: Mutex<Resolution>,
    precheck_calls: AtomicU32,
    submit_calls: AtomicU32,
}

impl MockRelay {
    pub fn new() -> Self {
        Self {
            precheck: Mutex::new(PrecheckOutcome::Success),
            resolution: Mutex::new(Resolution::Included {
                success: true,
                tx_hash: "0xmock".to_string(),
            }),
            precheck_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        }
    }

    pub fn set_precheck(&self, outcome: PrecheckOutcome) {
        *self.precheck.lock().unwrap() = outcome;
    }

    pub fn set_resolution(&self, resolution: Resolution) {
        *self.resolution.lock().unwrap() = resolution;
    }

    pub fn precheck_count(&self) -> u32 {
        self.precheck_calls.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

struct ScriptedHandle {
    resolution: Resolution,
}

#[async_trait]
impl ResolutionHandle for ScriptedHandle {
    async fn wait(self: Box<Self>) -> BotResult<Resolution> {
        Ok(self.resolution)
    }
}

#[async_trait]
impl Relay for MockRelay {
    async fn precheck(
        &self,
        _tx: &alloy::rpc::types::eth::TransactionRequest,
    ) -> BotResult<PrecheckOutcome> {
        self.precheck_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.precheck.lock().unwrap().clone())
    }

    async fn submit(
        &self,
        _tx: alloy::rpc::types::eth::TransactionRequest,
    ) -> BotResult<Box<dyn ResolutionHandle>> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedHandle {
            resolution: self.resolution.lock().unwrap().clone(),
        }))
    }

    async fn next_nonce(&self, _signer: Address) -> BotResult<u64> {
        Ok(7)
    }
}
