//! Oracle reading types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// One immutable observation of the reference price feed. A fresh fetch
/// produces a new reading; existing readings are never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct OracleReading {
    pub price: Decimal,
    pub source_decimals: u8,
    pub updated_at: DateTime<Utc>,
    pub round_id: u64,
    pub is_stale: bool,
}

impl OracleReading {
    pub fn deviation_from_peg(&self) -> Decimal {
        self.price - dec!(1.0)
    }

    pub fn deviation_pct(&self) -> Decimal {
        self.deviation_from_peg().abs() * dec!(100)
    }
}
