//! Full-path profit simulation
//!
//! Re-derives, off-chain, the exact sequence of amounts the on-chain
//! executor will see: flashloan, pool swaps at quoted rates, issuer
//! mint/redeem with live fees and oracle adjustment, repayment. The
//! profitability verdict is only as good as this arithmetic matching the
//! contracts bit-for-bit.

use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::warn;

use crate::config::{
    Config, GAS_FLASHLOAN, GAS_MINT, GAS_REDEEM, GAS_REPAY, GAS_SWAP,
    HIGH_ORACLE_IMPACT_PCT, SEVERE_OFFPEG_PCT,
};
use crate::errors::{BotError, BotResult};
use crate::issuer::IssuerVenue;
use crate::network::GasContext;
use crate::oracle::{mint_output_after_oracle, redeem_output_after_oracle, OracleFetcher};
use crate::pools::QuoteProvider;
use crate::types::{
    AmountSearch, ArbitrageScenario, MarketRoute, OracleReading, ProfitSimulation,
    SimulationStep, StepKind,
};
use crate::utils::amount::{from_raw, to_raw};
use crate::utils::math::{bps_factor, bps_fee};

pub struct ProfitSimulator {
    quotes: Arc<QuoteProvider>,
    oracle: Arc<OracleFetcher>,
    issuer: Arc<dyn IssuerVenue>,
    route: MarketRoute,
    flashloan_fee_bps: u32,
    min_profit_usd: Decimal,
}

/// Running state of one path walk: the ordered steps plus the amounts the
/// verdict needs. Dropped whole on any hop failure.
struct PathWalk {
    steps: Vec<SimulationStep>,
    reading: Option<OracleReading>,
    implied_pool_price: Option<Decimal>,
}

impl PathWalk {
    fn new() -> Self {
        Self {
            steps: Vec::new(),
            reading: None,
            implied_pool_price: None,
        }
    }

    fn push(&mut self, mut step: SimulationStep) {
        step.ordinal = self.steps.len() as u32;
        self.steps.push(step);
    }
}

impl ProfitSimulator {
    pub fn new(
        quotes: Arc<QuoteProvider>,
        oracle: Arc<OracleFetcher>,
        issuer: Arc<dyn IssuerVenue>,
        route: MarketRoute,
        config: &Config,
    ) -> Self {
        Self {
            quotes,
            oracle,
            issuer,
            route,
            flashloan_fee_bps: config.flashloan_fee_bps,
            min_profit_usd: config.min_profit_usd,
        }
    }

    /// Simulates the whole path for one candidate flashloan amount. A
    /// failing hop aborts the simulation; partial paths are never returned.
    pub async fn simulate(
        &self,
        scenario: ArbitrageScenario,
        flashloan_amount: Decimal,
        gas: &GasContext,
    ) -> BotResult<ProfitSimulation> {
        let base = &self.route.base;
        let principal = flashloan_amount;
        let flashloan_fee = bps_fee(principal, self.flashloan_fee_bps);
        let owed = principal + flashloan_fee;

        let mut walk = PathWalk::new();
        walk.push(SimulationStep {
            ordinal: 0,
            kind: StepKind::Flashloan,
            token_in: base.symbol.clone(),
            amount_in: principal,
            token_out: base.symbol.clone(),
            amount_out: principal,
            rate: dec!(1),
            fee_bps: self.flashloan_fee_bps,
            fee_amount: flashloan_fee,
            oracle_impact: None,
            venue: "flashloan".to_string(),
            gas_estimate: GAS_FLASHLOAN,
        });

        let recovered = match scenario {
            ArbitrageScenario::Rich => self.walk_rich(&mut walk, principal).await?,
            ArbitrageScenario::Cheap => self.walk_cheap(&mut walk, principal).await?,
            ArbitrageScenario::None => {
                return Err(BotError::Config(
                    "cannot simulate the NONE scenario".to_string(),
                ));
            }
        };

        let surplus = recovered - owed;
        walk.push(SimulationStep {
            ordinal: 0,
            kind: StepKind::Repay,
            token_in: base.symbol.clone(),
            amount_in: recovered,
            token_out: base.symbol.clone(),
            amount_out: surplus,
            rate: if recovered > dec!(0) { surplus / recovered } else { dec!(0) },
            fee_bps: 0,
            fee_amount: dec!(0),
            oracle_impact: None,
            venue: "flashloan".to_string(),
            gas_estimate: GAS_REPAY,
        });

        let gross_profit = recovered - owed;
        let gas_units: u64 = walk.steps.iter().map(|s| s.gas_estimate).sum();
        let gas_price = Decimal::from_u128(gas.gas_price_wei).ok_or_else(|| {
            BotError::DataParsing {
                context: format!("gas price {} exceeds decimal range", gas.gas_price_wei),
                source: anyhow::anyhow!("gas price overflow"),
            }
        })?;
        let gas_cost_native = Decimal::from(gas_units) * gas_price / crate::utils::pow10(18);
        let gas_cost_usd = gas_cost_native * gas.native_usd;
        // Base is a USD stable, so the fiat gas cost nets directly.
        let net_profit_usd = gross_profit - gas_cost_usd;
        let is_profitable = net_profit_usd > self.min_profit_usd;

        let mut warnings = Vec::new();
        let mut would_revert = false;
        if let Some(reading) = &walk.reading {
            if !self.oracle.is_within_tolerance(reading.price) {
                would_revert = true;
                warnings.push(format!(
                    "oracle price {:.6} outside issuer tolerance band; on-chain call would revert",
                    reading.price
                ));
            }
            if reading.deviation_pct() > HIGH_ORACLE_IMPACT_PCT {
                warnings.push(format!(
                    "oracle deviation {:.3}% exceeds high-impact threshold",
                    reading.deviation_pct()
                ));
            }
            if reading.is_stale {
                warnings.push("oracle reading is stale (older than 24h)".to_string());
            }
        }
        if net_profit_usd < dec!(0) {
            warnings.push(format!("negative net profit: ${:.4}", net_profit_usd));
        }
        if let Some(pool_price) = walk.implied_pool_price {
            let offpeg_pct = (pool_price - dec!(1.0)).abs() * dec!(100);
            if offpeg_pct > SEVERE_OFFPEG_PCT {
                warnings.push(format!(
                    "pool price {:.4} is {:.2}% off peg; slippage likely severe",
                    pool_price, offpeg_pct
                ));
            }
        }

        let recommendation = if is_profitable {
            format!(
                "Execute {} path with {:.2} {} flashloan (expected net ${:.4})",
                scenario, principal, base.symbol, net_profit_usd
            )
        } else {
            format!(
                "Do not execute: net ${:.4} below ${:.2} threshold",
                net_profit_usd, self.min_profit_usd
            )
        };

        Ok(ProfitSimulation {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            scenario,
            flashloan_amount: principal,
            steps: walk.steps,
            total_owed: owed,
            total_recovered: recovered,
            gross_profit,
            gas_cost_native,
            gas_cost_usd,
            net_profit_usd,
            is_profitable,
            would_revert,
            recommendation,
            warnings,
        })
    }

    /// RICH: swap base→intermediary→synth, then redeem synth at the issuer.
    async fn walk_rich(&self, walk: &mut PathWalk, principal: Decimal) -> BotResult<Decimal> {
        let route = &self.route;
        let base_raw = to_raw(principal, route.base.decimals as u32)?;

        let dy1 = self
            .quotes
            .quote(&route.pool_base_intermediary, &route.base, &route.intermediary, base_raw)
            .await
            .map_err(|e| BotError::at_hop("swap base->intermediary", e))?;
        let intermediary_amount = from_raw(dy1, route.intermediary.decimals as u32)?;
        walk.implied_pool_price = Some(principal / intermediary_amount);
        walk.push(swap_step(&route.base, principal, &route.intermediary, intermediary_amount,
            &route.pool_base_intermediary.name));

        let dy2 = self
            .quotes
            .quote(&route.pool_intermediary_synth, &route.intermediary, &route.synth, dy1)
            .await
            .map_err(|e| BotError::at_hop("swap intermediary->synth", e))?;
        let synth_amount = from_raw(dy2, route.synth.decimals as u32)?;
        walk.push(swap_step(&route.intermediary, intermediary_amount, &route.synth, synth_amount,
            &route.pool_intermediary_synth.name));

        let reading = self
            .oracle
            .get_price(route.oracle, true)
            .await
            .map_err(|e| BotError::at_hop("redeem oracle read", e))?;
        let redeem_bps = self
            .issuer
            .redeem_fee_bps()
            .await
            .map_err(|e| BotError::at_hop("redeem fee read", e))?;

        let adjusted = redeem_output_after_oracle(synth_amount, reading.price);
        let recovered = (adjusted * bps_factor(redeem_bps))
            .trunc_with_scale(route.base.decimals as u32);
        walk.push(SimulationStep {
            ordinal: 0,
            kind: StepKind::Redeem,
            token_in: route.synth.symbol.clone(),
            amount_in: synth_amount,
            token_out: route.base.symbol.clone(),
            amount_out: recovered,
            rate: if synth_amount > dec!(0) { recovered / synth_amount } else { dec!(0) },
            fee_bps: redeem_bps,
            fee_amount: adjusted - recovered,
            oracle_impact: Some(synth_amount - adjusted),
            venue: "issuer".to_string(),
            gas_estimate: GAS_REDEEM,
        });
        walk.reading = Some(reading);
        Ok(recovered)
    }

    /// CHEAP: mint synth at the issuer first, swap synth→intermediary→base.
    async fn walk_cheap(&self, walk: &mut PathWalk, principal: Decimal) -> BotResult<Decimal> {
        let route = &self.route;

        let reading = self
            .oracle
            .get_price(route.oracle, true)
            .await
            .map_err(|e| BotError::at_hop("mint oracle read", e))?;
        let mint_bps = self
            .issuer
            .mint_fee_bps()
            .await
            .map_err(|e| BotError::at_hop("mint fee read", e))?;

        let adjusted = mint_output_after_oracle(principal, reading.price);
        let minted = (adjusted * bps_factor(mint_bps))
            .trunc_with_scale(route.synth.decimals as u32);
        walk.push(SimulationStep {
            ordinal: 0,
            kind: StepKind::Mint,
            token_in: route.base.symbol.clone(),
            amount_in: principal,
            token_out: route.synth.symbol.clone(),
            amount_out: minted,
            rate: if principal > dec!(0) { minted / principal } else { dec!(0) },
            fee_bps: mint_bps,
            fee_amount: adjusted - minted,
            oracle_impact: Some(principal - adjusted),
            venue: "issuer".to_string(),
            gas_estimate: GAS_MINT,
        });
        walk.reading = Some(reading);

        let synth_raw = to_raw(minted, route.synth.decimals as u32)?;
        let dy1 = self
            .quotes
            .quote(&route.pool_intermediary_synth, &route.synth, &route.intermediary, synth_raw)
            .await
            .map_err(|e| BotError::at_hop("swap synth->intermediary", e))?;
        let intermediary_amount = from_raw(dy1, route.intermediary.decimals as u32)?;
        walk.push(swap_step(&route.synth, minted, &route.intermediary, intermediary_amount,
            &route.pool_intermediary_synth.name));

        let dy2 = self
            .quotes
            .quote(&route.pool_base_intermediary, &route.intermediary, &route.base, dy1)
            .await
            .map_err(|e| BotError::at_hop("swap intermediary->base", e))?;
        let recovered = from_raw(dy2, route.base.decimals as u32)?;
        walk.implied_pool_price = Some(recovered / intermediary_amount);
        walk.push(swap_step(&route.intermediary, intermediary_amount, &route.base, recovered,
            &route.pool_base_intermediary.name));

        Ok(recovered)
    }

    /// Runs the full simulation once per candidate amount. Quotes are
    /// path-dependent and slippage is non-linear, so there is no closed
    /// form here: every candidate is evaluated independently.
    pub async fn find_best_amount(
        &self,
        scenario: ArbitrageScenario,
        candidates: &[Decimal],
        gas: &GasContext,
    ) -> BotResult<AmountSearch> {
        let mut simulations = Vec::new();
        let mut last_error = None;

        for &amount in candidates {
            match self.simulate(scenario, amount, gas).await {
                Ok(sim) => simulations.push(sim),
                Err(e) => {
                    warn!("Candidate {:.2} failed to simulate: {}", amount, e);
                    last_error = Some(e);
                }
            }
        }

        if simulations.is_empty() {
            let source = last_error.unwrap_or_else(|| {
                BotError::Config("no candidate amounts configured".to_string())
            });
            return Err(BotError::at_hop("candidate amount search", source));
        }

        let best_index = simulations
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.net_profit_usd.cmp(&b.net_profit_usd))
            .map(|(i, _)| i)
            .unwrap();

        Ok(AmountSearch { simulations, best_index })
    }
}

fn swap_step(
    token_in: &crate::types::Token,
    amount_in: Decimal,
    token_out: &crate::types::Token,
    amount_out: Decimal,
    venue: &str,
) -> SimulationStep {
    SimulationStep {
        ordinal: 0,
        kind: StepKind::Swap,
        token_in: token_in.symbol.clone(),
        amount_in,
        token_out: token_out.symbol.clone(),
        amount_out,
        rate: if amount_in > dec!(0) { amount_out / amount_in } else { dec!(0) },
        fee_bps: 0,
        fee_amount: dec!(0),
        oracle_impact: None,
        venue: venue.to_string(),
        gas_estimate: GAS_SWAP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        config_fixture, gas_fixture, route_fixture, MockIssuerVenue, MockOracleVenue,
        MockPoolVenue,
    };
    use std::time::Duration;

    struct Fixture {
        simulator: ProfitSimulator,
        pool_venue: Arc<MockPoolVenue>,
        oracle_venue: Arc<MockOracleVenue>,
        route: MarketRoute,
    }

    fn fixture(oracle_price: Decimal) -> Fixture {
        let route = route_fixture();
        let pool_venue = Arc::new(MockPoolVenue::for_route(&route));
        let oracle_venue = Arc::new(MockOracleVenue::new(oracle_price));
        let quotes = Arc::new(QuoteProvider::new(
            pool_venue.clone(),
            vec![route.pool_base_intermediary.clone(), route.pool_intermediary_synth.clone()],
        ));
        let oracle = Arc::new(OracleFetcher::new(
            oracle_venue.clone(),
            Duration::from_secs(60),
            Duration::from_secs(86_400),
            dec!(1),
        ));
        let issuer = Arc::new(MockIssuerVenue::new(20, 10));
        let simulator = ProfitSimulator::new(
            quotes,
            oracle,
            issuer,
            route.clone(),
            &config_fixture(),
        );
        Fixture { simulator, pool_venue, oracle_venue, route }
    }

    #[tokio::test]
    async fn rich_path_closes_the_loop_in_order() {
        let f = fixture(dec!(1.0));
        // base->intermediary slightly under par, intermediary->synth above par
        f.pool_venue.set_rate_dir(f.route.pool_base_intermediary.address, 0, 1, dec!(0.995));
        f.pool_venue.set_rate_dir(f.route.pool_intermediary_synth.address, 0, 1, dec!(1.012));

        let sim = f.simulator
            .simulate(ArbitrageScenario::Rich, dec!(1000), &gas_fixture())
            .await
            .unwrap();

        assert!(!sim.steps.is_empty());
        for (i, step) in sim.steps.iter().enumerate() {
            assert_eq!(step.ordinal, i as u32);
        }
        let kinds: Vec<StepKind> = sim.steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![
            StepKind::Flashloan, StepKind::Swap, StepKind::Swap,
            StepKind::Redeem, StepKind::Repay,
        ]);
        // Path must end back in the borrowed token
        assert_eq!(sim.steps.last().unwrap().token_out, f.route.base.symbol);

        // 1000 * 0.995 * 1.012 * (1 - 0.001) = 1005.93...
        assert_eq!(sim.total_owed, dec!(1000.9));
        assert!(sim.total_recovered > dec!(1005.9) && sim.total_recovered < dec!(1006));
        assert!(sim.net_profit_usd > dec!(1));
        assert!(sim.is_profitable);
        assert!(!sim.would_revert);
    }

    #[tokio::test]
    async fn cheap_path_applies_mint_haircut_and_fee() {
        let f = fixture(dec!(0.98));
        f.pool_venue.set_rate_dir(f.route.pool_intermediary_synth.address, 1, 0, dec!(1.04));
        f.pool_venue.set_rate_dir(f.route.pool_base_intermediary.address, 1, 0, dec!(1.0));

        let sim = f.simulator
            .simulate(ArbitrageScenario::Cheap, dec!(1000), &gas_fixture())
            .await
            .unwrap();

        let mint = &sim.steps[1];
        assert_eq!(mint.kind, StepKind::Mint);
        // 1000 * 0.98 oracle haircut, then 20 bps issuer fee
        assert_eq!(mint.oracle_impact, Some(dec!(20)));
        assert_eq!(mint.amount_out, dec!(978.04));
        assert_eq!(sim.steps.last().unwrap().token_out, f.route.base.symbol);
        // 0.98 sits outside the 1% tolerance band
        assert!(sim.would_revert);
    }

    #[tokio::test]
    async fn off_tolerance_oracle_warns_would_revert_even_when_profitable() {
        let f = fixture(dec!(1.02));
        // Rates generous enough that the path profits despite the redeem haircut
        f.pool_venue.set_rate_dir(f.route.pool_base_intermediary.address, 0, 1, dec!(1.03));
        f.pool_venue.set_rate_dir(f.route.pool_intermediary_synth.address, 0, 1, dec!(1.03));

        let sim = f.simulator
            .simulate(ArbitrageScenario::Rich, dec!(1000), &gas_fixture())
            .await
            .unwrap();

        assert!(sim.net_profit_usd > dec!(0));
        assert!(sim.would_revert);
        assert!(sim.warnings.iter().any(|w| w.contains("would revert")));
        // Advisory only: the profitability flag is still the sole gate
        assert!(sim.is_profitable);
    }

    #[tokio::test]
    async fn hop_failure_aborts_whole_simulation() {
        let f = fixture(dec!(1.0));
        f.pool_venue.set_rate_dir(f.route.pool_intermediary_synth.address, 0, 1, dec!(0));

        let err = f.simulator
            .simulate(ArbitrageScenario::Rich, dec!(1000), &gas_fixture())
            .await
            .unwrap_err();
        match err {
            BotError::Simulation { hop, .. } => assert_eq!(hop, "swap intermediary->synth"),
            other => panic!("expected Simulation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn none_scenario_is_not_simulatable() {
        let f = fixture(dec!(1.0));
        assert!(f.simulator
            .simulate(ArbitrageScenario::None, dec!(1000), &gas_fixture())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn best_amount_keeps_all_candidates_and_picks_the_max() {
        let f = fixture(dec!(1.0));
        f.pool_venue.set_rate_dir(f.route.pool_base_intermediary.address, 0, 1, dec!(0.999));
        f.pool_venue.set_rate_dir(f.route.pool_intermediary_synth.address, 0, 1, dec!(1.01));

        let search = f.simulator
            .find_best_amount(
                ArbitrageScenario::Rich,
                &[dec!(1), dec!(10), dec!(1000)],
                &gas_fixture(),
            )
            .await
            .unwrap();

        assert_eq!(search.simulations.len(), 3);
        let best_net = search.best().net_profit_usd;
        for sim in &search.simulations {
            assert!(sim.net_profit_usd <= best_net);
        }
        // Linear mock rates: fixed gas dominates small loans, so the
        // largest candidate wins
        assert_eq!(search.best().flashloan_amount, dec!(1000));
    }

    #[tokio::test]
    async fn best_amount_fails_when_every_candidate_fails() {
        let f = fixture(dec!(1.0));
        f.pool_venue.set_rate_dir(f.route.pool_base_intermediary.address, 0, 1, dec!(0));

        let err = f.simulator
            .find_best_amount(ArbitrageScenario::Rich, &[dec!(10), dec!(100)], &gas_fixture())
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Simulation { .. }));
    }

    #[tokio::test]
    async fn stale_oracle_reading_is_warned() {
        let f = fixture(dec!(1.0));
        f.oracle_venue.set_updated_at(chrono::Utc::now().timestamp() - 3 * 86_400);
        f.pool_venue.set_rate_dir(f.route.pool_base_intermediary.address, 0, 1, dec!(1.0));

        let sim = f.simulator
            .simulate(ArbitrageScenario::Rich, dec!(1000), &gas_fixture())
            .await
            .unwrap();
        assert!(sim.warnings.iter().any(|w| w.contains("stale")));
    }
}
