//! Arbitrage scenario and opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Market classification relative to the peg. `Rich`: intermediary trades
/// above peg, favoring the redeem-last path. `Cheap`: below peg, favoring
/// the mint-first path. `None`: inside the threshold band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArbitrageScenario {
    Rich,
    Cheap,
    None,
}

impl std::fmt::Display for ArbitrageScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArbitrageScenario::Rich => write!(f, "RICH"),
            ArbitrageScenario::Cheap => write!(f, "CHEAP"),
            ArbitrageScenario::None => write!(f, "NONE"),
        }
    }
}

/// Emitted by the monitor on a scenario transition, at most once per
/// transition. Repeated polls inside the same scenario do not re-emit.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    pub scenario: ArbitrageScenario,
    pub reference_price: Decimal,
    pub deviation_pct: Decimal,
}
