//! Profit simulation types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::ArbitrageScenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKind {
    Flashloan,
    Swap,
    Mint,
    Redeem,
    Repay,
}

/// One hop of a simulated path. Amounts are the real quoted values in each
/// token's native precision, produced in strict execution order and
/// read-only once created.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStep {
    pub ordinal: u32,
    pub kind: StepKind,
    pub token_in: String,
    pub amount_in: Decimal,
    pub token_out: String,
    pub amount_out: Decimal,
    pub rate: Decimal,
    pub fee_bps: u32,
    pub fee_amount: Decimal,
    pub oracle_impact: Option<Decimal>,
    pub venue: String,
    pub gas_estimate: u64,
}

/// Complete verdict for one candidate flashloan amount. Created fresh per
/// call and never cached: pool and oracle state move every block.
#[derive(Debug, Clone, Serialize)]
pub struct ProfitSimulation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub scenario: ArbitrageScenario,
    pub flashloan_amount: Decimal,
    pub steps: Vec<SimulationStep>,
    pub total_owed: Decimal,
    pub total_recovered: Decimal,
    pub gross_profit: Decimal,
    pub gas_cost_native: Decimal,
    pub gas_cost_usd: Decimal,
    pub net_profit_usd: Decimal,
    pub is_profitable: bool,
    pub would_revert: bool,
    pub recommendation: String,
    pub warnings: Vec<String>,
}

impl ProfitSimulation {
    pub fn total_gas_estimate(&self) -> u64 {
        self.steps.iter().map(|s| s.gas_estimate).sum()
    }
}

/// Result of sampling the candidate flashloan sizes. All candidate
/// simulations are retained, not just the winner.
#[derive(Debug, Clone)]
pub struct AmountSearch {
    pub simulations: Vec<ProfitSimulation>,
    pub best_index: usize,
}

impl AmountSearch {
    pub fn best(&self) -> &ProfitSimulation {
        &self.simulations[self.best_index]
    }
}
