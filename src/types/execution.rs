//! Execution pipeline types

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::ArbitrageScenario;

/// Slippage-adjusted minimum outputs for the three intermediate hops, in
/// each hop's output-token raw precision. The on-chain executor reverts if
/// any hop falls short of its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinOutputs {
    pub hop1: U256,
    pub hop2: U256,
    pub final_out: U256,
}

/// Stages of one execution attempt, logged as the attempt advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    Simulated,
    ParamsComputed,
    TxBuilt,
    PrecheckSimulated,
    Submitted,
}

/// Precheck ("dry run against the next block") verdict. A revert and a
/// transport error lead to different retry handling, so they stay distinct.
#[derive(Debug, Clone)]
pub enum PrecheckOutcome {
    Success,
    Revert { reason: String },
    Error { reason: String },
}

/// What the relay reports once the target block has passed.
#[derive(Debug, Clone)]
pub enum Resolution {
    Included { success: bool, tx_hash: String },
    NotIncluded,
    NonceConflict,
}

/// Terminal outcome of one attempt. `MinedButFailed` is kept apart from
/// `PrecheckReverted`: the former burned gas after a clean precheck and
/// signals live-state divergence, the latter cost nothing.
#[derive(Debug, Clone, Serialize)]
pub enum AttemptOutcome {
    NotProfitable,
    SafetyRejected { reason: String },
    PrecheckError { reason: String },
    PrecheckReverted { reason: String },
    Executed { tx_hash: String },
    MinedButFailed { tx_hash: String },
    NotIncluded,
    NonceConflict,
}

impl AttemptOutcome {
    /// Non-fatal outcomes are resolved by retrying on the next polling
    /// cycle with fresh state.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::PrecheckError { .. }
                | AttemptOutcome::PrecheckReverted { .. }
                | AttemptOutcome::NotIncluded
                | AttemptOutcome::NonceConflict
        )
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, AttemptOutcome::MinedButFailed { .. })
    }
}

/// Record of one execution attempt, created per attempt and discarded after
/// resolution; never reused across polling cycles.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionAttempt {
    pub id: String,
    pub opportunity_id: String,
    pub timestamp: DateTime<Utc>,
    pub scenario: ArbitrageScenario,
    pub flashloan_amount: Decimal,
    pub min_outputs: Option<[Decimal; 3]>,
    pub expected_net_profit_usd: Decimal,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}
