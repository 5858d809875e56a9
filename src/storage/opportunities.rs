//! Opportunity and simulation storage

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;
use crate::types::{ArbitrageOpportunity, ProfitSimulation};

#[derive(Serialize)]
struct OpportunityRecord<'a> {
    opportunity: &'a ArbitrageOpportunity,
    best_simulation: &'a ProfitSimulation,
}

/// Appends the opportunity together with its winning simulation to the
/// daily jsonl file.
pub fn save_opportunity(opp: &ArbitrageOpportunity, best: &ProfitSimulation) -> Result<()> {
    let filename = format!(
        "output/opportunities/opportunities_{}.jsonl",
        Utc::now().format("%Y-%m-%d")
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    let record = OpportunityRecord {
        opportunity: opp,
        best_simulation: best,
    };
    writeln!(file, "{}", serde_json::to_string(&record)?)?;

    info!(
        opportunity_id = %opp.id,
        scenario = %opp.scenario,
        net_profit = %best.net_profit_usd,
        "Saved opportunity"
    );

    Ok(())
}
