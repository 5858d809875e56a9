//! SynthUSD Peg Arbitrage Bot - Main Entry Point

use synthusd_peg_arb::*;
use anyhow::Result;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use alloy::signers::local::PrivateKeySigner;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    // Load configuration
    let config = CONFIG.clone();

    info!("🪙 SynthUSD Peg Arbitrage Bot v0.3.0");
    info!("📋 Configuration:");
    info!("   Check interval: {} ms", config.check_interval_ms);
    info!("   Scenario thresholds: cheap < {} | rich > {}", config.cheap_threshold, config.rich_threshold);
    info!("   Issuer tolerance band: ±{}%", config.tolerance_band_pct);
    info!("   Min Profit: ${}", config.min_profit_usd);
    info!("   Flashloan candidates: {:?}", config.flashloan_amounts);
    info!("   Execution: {}", config.enable_execution);
    if config.enable_execution {
        info!("   Max Gas Price: {} gwei", config.max_gas_price_gwei);
        info!("   Slippage protection: {} bps", config.slippage_bps);
    }

    config.validate()?;
    let route = config.route()?;
    info!("   Route: {} / {} / {}", route.base.symbol, route.intermediary.symbol, route.synth.symbol);

    // Setup network provider and on-chain venues
    let provider = network::setup_provider(&config).await?;
    let pool_venue = Arc::new(pools::ChainPool::new(provider.clone()));
    let quotes = Arc::new(pools::QuoteProvider::new(
        pool_venue,
        vec![
            route.pool_base_intermediary.clone(),
            route.pool_intermediary_synth.clone(),
        ],
    ));
    quotes.initialize().await?;
    info!("✅ Pool coin lists verified");

    let oracle = Arc::new(oracle::OracleFetcher::new(
        Arc::new(oracle::ChainOracle::new(provider.clone())),
        Duration::from_secs(config.oracle_cache_ttl_secs),
        Duration::from_secs(config.oracle_stale_secs),
        config.tolerance_band_pct,
    ));
    let issuer = Arc::new(issuer::ChainIssuer::new(provider.clone(), route.issuer));
    let simulator = simulator::ProfitSimulator::new(
        quotes.clone(),
        oracle,
        issuer,
        route.clone(),
        &config,
    );

    let pipeline = if config.enable_execution {
        let pk = config
            .private_key
            .as_ref()
            .expect("validated: PRIVATE_KEY present when execution enabled");
        let signer = PrivateKeySigner::from_str(pk)
            .map_err(|e| anyhow::anyhow!("Failed to parse private key: {e}"))?;
        let relay = Arc::new(execution::ProviderRelay::new(provider.clone()));
        info!("🚀 Execution pipeline armed, signer {}", signer.address());
        Some(execution::ExecutionPipeline::new(
            relay,
            config.executor_address.expect("validated: EXECUTOR_ADDRESS present"),
            signer.address(),
            route.clone(),
            &config,
        ))
    } else {
        info!("👀 Detection-only mode, no transactions will be sent");
        None
    };

    let circuit_breaker = errors::CircuitBreaker::new(
        config.max_consecutive_errors,
        config.circuit_breaker_cooldown_secs,
    );

    // Start the monitor
    let (opportunity_tx, mut opportunity_rx) = mpsc::channel(8);
    let monitor = monitor::OpportunityMonitor::new(quotes.clone(), &route, &config, opportunity_tx);
    let monitor_handle = monitor.start(Duration::from_millis(config.check_interval_ms));

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown_tx = Arc::new(tokio::sync::Mutex::new(Some(shutdown_tx)));
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        if let Some(tx) = shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
    });

    info!("\n🚀 Monitoring for peg deviations...\n");

    let start_time = Instant::now();
    let mut stats = SessionStats::new();
    let mut stats_ticker = time::interval(Duration::from_secs(300));
    stats_ticker.tick().await; // the first tick completes immediately

    loop {
        tokio::select! {
            maybe_opportunity = opportunity_rx.recv() => {
                let Some(opportunity) = maybe_opportunity else {
                    warn!("Monitor channel closed, exiting main loop");
                    break;
                };
                stats.total_opportunities += 1;
                utils::print_opportunity(&opportunity);

                if !circuit_breaker.can_proceed().await {
                    warn!("Circuit breaker open, skipping opportunity {}", opportunity.id);
                    continue;
                }

                match handle_opportunity(
                    &opportunity,
                    &simulator,
                    pipeline.as_ref(),
                    &provider,
                    &config,
                    &mut stats,
                ).await {
                    Ok(()) => circuit_breaker.record_success().await,
                    Err(e) => {
                        error!("Failed to handle opportunity {}: {}", opportunity.id, e);
                        *stats.error_counts.entry(e.category().to_string()).or_insert(0) += 1;
                        if circuit_breaker.record_error().await {
                            error!("🔴 Circuit breaker activated after repeated failures");
                        }
                    }
                }
            }
            _ = stats_ticker.tick() => {
                utils::print_session_stats(
                    start_time,
                    stats.total_opportunities,
                    stats.profitable_simulations,
                    stats.total_attempts,
                    stats.executed_attempts,
                    &stats.error_counts,
                    &circuit_breaker,
                ).await;
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    monitor_handle.stop().await;
    utils::print_session_stats(
        start_time,
        stats.total_opportunities,
        stats.profitable_simulations,
        stats.total_attempts,
        stats.executed_attempts,
        &stats.error_counts,
        &circuit_breaker,
    ).await;

    Ok(())
}

/// Session counters for the final report.
struct SessionStats {
    total_opportunities: u64,
    profitable_simulations: u64,
    total_attempts: u64,
    executed_attempts: u64,
    error_counts: HashMap<String, u32>,
}

impl SessionStats {
    fn new() -> Self {
        Self {
            total_opportunities: 0,
            profitable_simulations: 0,
            total_attempts: 0,
            executed_attempts: 0,
            error_counts: HashMap::new(),
        }
    }
}

/// Simulates the candidate flashloan sizes for one detected opportunity
/// and, when armed and profitable, runs an execution attempt.
async fn handle_opportunity(
    opportunity: &ArbitrageOpportunity,
    simulator: &simulator::ProfitSimulator,
    pipeline: Option<&execution::ExecutionPipeline>,
    provider: &Arc<ConcreteProvider>,
    config: &Config,
    stats: &mut SessionStats,
) -> BotResult<()> {
    let gas = network::fetch_gas_context(provider, config).await?;
    let search = simulator
        .find_best_amount(opportunity.scenario, &config.flashloan_amounts, &gas)
        .await?;
    let best = search.best();
    utils::print_simulation(best);

    if best.is_profitable {
        stats.profitable_simulations += 1;
    }
    if let Err(e) = storage::save_opportunity(opportunity, best) {
        warn!("Failed to persist opportunity {}: {}", opportunity.id, e);
    }

    let Some(pipeline) = pipeline else {
        return Ok(());
    };
    if !best.is_profitable {
        return Ok(());
    }

    let attempt = pipeline.run_attempt(best, &opportunity.id).await;
    stats.total_attempts += 1;
    if matches!(attempt.outcome, AttemptOutcome::Executed { .. }) {
        stats.executed_attempts += 1;
    }
    utils::print_attempt(&attempt);
    if let Err(e) = storage::save_attempt(&attempt) {
        warn!("Failed to persist attempt {}: {}", attempt.id, e);
    }
    Ok(())
}
