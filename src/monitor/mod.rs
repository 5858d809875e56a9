//! Edge-triggered opportunity monitor

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::BotResult;
use crate::pools::QuoteProvider;
use crate::types::{ArbitrageOpportunity, ArbitrageScenario, MarketRoute, PoolIdentity, Token};

/// Polls the reference price and emits an opportunity only on a scenario
/// transition. `last_scenario` has exactly one writer: this monitor.
pub struct OpportunityMonitor {
    quotes: Arc<QuoteProvider>,
    pool: PoolIdentity,
    base: Token,
    intermediary: Token,
    rich_threshold: Decimal,
    cheap_threshold: Decimal,
    last_scenario: ArbitrageScenario,
    sink: mpsc::Sender<ArbitrageOpportunity>,
}

pub struct MonitorHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

impl OpportunityMonitor {
    pub fn new(
        quotes: Arc<QuoteProvider>,
        route: &MarketRoute,
        config: &Config,
        sink: mpsc::Sender<ArbitrageOpportunity>,
    ) -> Self {
        Self {
            quotes,
            pool: route.pool_base_intermediary.clone(),
            base: route.base.clone(),
            intermediary: route.intermediary.clone(),
            rich_threshold: config.rich_threshold,
            cheap_threshold: config.cheap_threshold,
            last_scenario: ArbitrageScenario::None,
            sink,
        }
    }

    /// Thresholds straddle 1.0 with no gap: the band itself, boundaries
    /// included, classifies as no-action.
    pub fn classify(&self, price: Decimal) -> ArbitrageScenario {
        if price > self.rich_threshold {
            ArbitrageScenario::Rich
        } else if price < self.cheap_threshold {
            ArbitrageScenario::Cheap
        } else {
            ArbitrageScenario::None
        }
    }

    /// One poll. Emits at most one opportunity, and only when the scenario
    /// changed since the previous poll. The scenario state is updated
    /// unconditionally, including back to `None`, so a RICH→NONE→RICH
    /// cycle notifies again.
    pub async fn check_once(&mut self) -> BotResult<ArbitrageScenario> {
        let price = self
            .quotes
            .reference_price(&self.pool, &self.intermediary, &self.base)
            .await?;
        let scenario = self.classify(price);

        debug!("Reference price {:.6} classified as {}", price, scenario);

        if scenario != ArbitrageScenario::None && scenario != self.last_scenario {
            let opportunity = ArbitrageOpportunity {
                id: uuid::Uuid::new_v4().to_string(),
                detected_at: Utc::now(),
                scenario,
                reference_price: price,
                deviation_pct: (price - dec!(1.0)).abs() * dec!(100),
            };
            info!(
                "🔔 Scenario transition {} -> {} at price {:.6}",
                self.last_scenario, scenario, price
            );
            if let Err(e) = self.sink.try_send(opportunity) {
                warn!("Opportunity channel full, dropping notification: {}", e);
            }
        }

        self.last_scenario = scenario;
        Ok(scenario)
    }

    /// Runs `check_once` on a repeating timer. Ticks are awaited serially,
    /// so an in-flight check is never overlapped by the next tick. Fetch
    /// failures are logged and swallowed; they never stop the timer.
    pub fn start(mut self, interval: Duration) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.check_once().await {
                            warn!("Monitor check failed, continuing: {}", e);
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Monitor stopping");
                        break;
                    }
                }
            }
        });
        MonitorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}
