//! Display and printing utilities

use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};
use crate::{
    errors::CircuitBreaker,
    types::{ArbitrageOpportunity, AttemptOutcome, ExecutionAttempt, ProfitSimulation},
};

pub async fn print_session_stats(
    start_time: Instant,
    total_opportunities: u64,
    profitable_simulations: u64,
    total_attempts: u64,
    executed_attempts: u64,
    error_counts: &HashMap<String, u32>,
    circuit_breaker: &CircuitBreaker,
) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   📈 DETECTION:");
    info!("     Scenario transitions: {}", total_opportunities);
    info!("     Profitable simulations: {}", profitable_simulations);
    info!("   🚀 EXECUTION:");
    info!("     Attempts: {}", total_attempts);
    info!("     Included successfully: {}", executed_attempts);
    info!("     Inclusion rate: {:.1}%",
        if total_attempts > 0 {
            (executed_attempts as f64 / total_attempts as f64) * 100.0
        } else {
            0.0
        }
    );
    info!("   ⚙️  SYSTEM:");
    info!("     Circuit breaker: {}",
        if *circuit_breaker.is_open.read().await { "OPEN" } else { "CLOSED" }
    );

    if !error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}

pub fn print_opportunity(opportunity: &ArbitrageOpportunity) {
    warn!("\n🎯 PEG OPPORTUNITY #{}", opportunity.id);
    warn!("📋 Scenario: {}", opportunity.scenario);
    warn!("💹 Reference price: {:.6} ({:.3}% off peg)",
        opportunity.reference_price, opportunity.deviation_pct);
}

pub fn print_simulation(sim: &ProfitSimulation) {
    info!("🧮 Simulation {} [{}] flashloan {:.2}", sim.id, sim.scenario, sim.flashloan_amount);
    for step in &sim.steps {
        info!(
            "   #{} {:?} {} {:.6} -> {} {:.6} (fee {} bps) via {}",
            step.ordinal, step.kind,
            step.token_in, step.amount_in,
            step.token_out, step.amount_out,
            step.fee_bps, step.venue
        );
    }
    info!("   Owed: {:.6} | Recovered: {:.6} | Gas: ${:.4}",
        sim.total_owed, sim.total_recovered, sim.gas_cost_usd);
    info!("   Net profit: ${:.4} | Profitable: {}", sim.net_profit_usd, sim.is_profitable);
    for warning in &sim.warnings {
        warn!("   ⚠️  {}", warning);
    }
    info!("   💡 {}", sim.recommendation);
}

pub fn print_attempt(attempt: &ExecutionAttempt) {
    match &attempt.outcome {
        AttemptOutcome::Executed { tx_hash } => {
            info!("✅ Attempt {} executed: {} ({} ms)", attempt.id, tx_hash, attempt.duration_ms);
        }
        AttemptOutcome::MinedButFailed { tx_hash } => {
            tracing::error!(
                "🔥 Attempt {} mined but FAILED despite clean precheck: {} (live state diverged)",
                attempt.id, tx_hash
            );
        }
        other => {
            warn!("↩️  Attempt {} resolved: {:?} ({} ms)", attempt.id, other, attempt.duration_ms);
        }
    }
}
