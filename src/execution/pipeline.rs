//! Attempt orchestration
//!
//! Walks one simulation through parameter derivation, calldata build,
//! precheck, submission, and resolution. Every attempt is a fresh record;
//! a failed attempt leaves nothing behind but its log entry and the next
//! polling cycle starts from clean state.

use alloy::primitives::Address;
use alloy::rpc::types::eth::TransactionRequest;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{BotError, BotResult};
use crate::execution::builder::build_execute_call;
use crate::execution::params::compute_min_outputs;
use crate::execution::relay::Relay;
use crate::types::{
    AttemptOutcome, ExecutionAttempt, MarketRoute, PipelineStage, PrecheckOutcome,
    ProfitSimulation, Resolution,
};
use crate::utils::amount::to_raw;

pub struct ExecutionPipeline {
    relay: Arc<dyn Relay>,
    executor: Address,
    signer: Address,
    route: MarketRoute,
    slippage_bps: u32,
    max_gas_price_gwei: u32,
}

impl ExecutionPipeline {
    pub fn new(
        relay: Arc<dyn Relay>,
        executor: Address,
        signer: Address,
        route: MarketRoute,
        config: &Config,
    ) -> Self {
        Self {
            relay,
            executor,
            signer,
            route,
            slippage_bps: config.slippage_bps,
            max_gas_price_gwei: config.max_gas_price_gwei,
        }
    }

    /// Runs one full attempt for an already-simulated opportunity. Never
    /// returns an error: every failure mode maps to a terminal outcome so
    /// the caller's loop only has to look at the attempt record.
    pub async fn run_attempt(
        &self,
        sim: &ProfitSimulation,
        opportunity_id: &str,
    ) -> ExecutionAttempt {
        let started = Instant::now();
        let mut min_outputs = None;
        let outcome = self
            .advance(sim, &mut min_outputs)
            .await
            .unwrap_or_else(|outcome| outcome);

        let attempt = ExecutionAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            opportunity_id: opportunity_id.to_string(),
            timestamp: Utc::now(),
            scenario: sim.scenario,
            flashloan_amount: sim.flashloan_amount,
            min_outputs,
            expected_net_profit_usd: sim.net_profit_usd,
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        if attempt.outcome.is_critical() {
            warn!(
                "Attempt {} mined but failed after a clean precheck; live state diverged",
                attempt.id
            );
        }
        attempt
    }

    /// The pipeline body. `Err` carries the terminal outcome of whichever
    /// stage bailed; `Ok` means the transaction resolved.
    async fn advance(
        &self,
        sim: &ProfitSimulation,
        min_outputs: &mut Option<[rust_decimal::Decimal; 3]>,
    ) -> Result<AttemptOutcome, AttemptOutcome> {
        self.transition(PipelineStage::Simulated);
        if !sim.is_profitable {
            return Err(AttemptOutcome::NotProfitable);
        }
        if sim.would_revert {
            return Err(AttemptOutcome::SafetyRejected {
                reason: "simulation flags an on-chain revert (oracle outside tolerance)"
                    .to_string(),
            });
        }

        let mins = match compute_min_outputs(sim, &self.route, self.slippage_bps) {
            Ok(mins) => mins,
            Err(BotError::ThinMargin { details }) => {
                return Err(AttemptOutcome::SafetyRejected { reason: details });
            }
            Err(e) => {
                return Err(AttemptOutcome::PrecheckError {
                    reason: format!("parameter derivation failed: {e}"),
                });
            }
        };
        *min_outputs = Some(mins.human);
        self.transition(PipelineStage::ParamsComputed);

        let tx = self
            .build_transaction(sim, &mins)
            .await
            .map_err(|e| AttemptOutcome::PrecheckError {
                reason: format!("transaction build failed: {e}"),
            })?;
        self.transition(PipelineStage::TxBuilt);

        match self.relay.precheck(&tx).await {
            Ok(PrecheckOutcome::Success) => {}
            Ok(PrecheckOutcome::Revert { reason }) => {
                info!("Precheck reverted, skipping submission: {}", reason);
                return Err(AttemptOutcome::PrecheckReverted { reason });
            }
            Ok(PrecheckOutcome::Error { reason }) => {
                return Err(AttemptOutcome::PrecheckError { reason });
            }
            Err(e) => {
                return Err(AttemptOutcome::PrecheckError { reason: e.to_string() });
            }
        }
        self.transition(PipelineStage::PrecheckSimulated);

        let handle = self
            .relay
            .submit(tx)
            .await
            .map_err(|e| AttemptOutcome::PrecheckError {
                reason: format!("submission failed: {e}"),
            })?;
        self.transition(PipelineStage::Submitted);

        match handle.wait().await {
            Ok(Resolution::Included { success: true, tx_hash }) => {
                Ok(AttemptOutcome::Executed { tx_hash })
            }
            Ok(Resolution::Included { success: false, tx_hash }) => {
                Ok(AttemptOutcome::MinedButFailed { tx_hash })
            }
            Ok(Resolution::NotIncluded) => Ok(AttemptOutcome::NotIncluded),
            Ok(Resolution::NonceConflict) => Ok(AttemptOutcome::NonceConflict),
            Err(e) => {
                warn!("Resolution wait failed: {}", e);
                Ok(AttemptOutcome::NotIncluded)
            }
        }
    }

    async fn build_transaction(
        &self,
        sim: &ProfitSimulation,
        mins: &crate::execution::params::HopMinimums,
    ) -> BotResult<TransactionRequest> {
        let flashloan_raw = to_raw(sim.flashloan_amount, self.route.base.decimals as u32)?;
        let calldata = build_execute_call(sim.scenario, flashloan_raw, &mins.raw);
        let nonce = self.relay.next_nonce(self.signer).await?;
        // 20% headroom over the per-step estimates
        let gas_limit = sim.total_gas_estimate() * 12 / 10;
        Ok(TransactionRequest::default()
            .to(self.executor)
            .from(self.signer)
            .input(calldata.into())
            .nonce(nonce)
            .gas_limit(gas_limit)
            .max_fee_per_gas(self.max_gas_price_gwei as u128 * 1_000_000_000)
            .max_priority_fee_per_gas(1_000_000_000))
    }

    fn transition(&self, stage: PipelineStage) {
        debug!("Pipeline stage: {:?}", stage);
    }
}
