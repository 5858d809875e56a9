//! Decimal-aware amount conversions
//!
//! All on-chain amounts are integers in the token's native precision (6 or
//! 18 fractional digits in this domain). Conversions between the integer
//! view and the human `Decimal` view must be exact: the profitability
//! verdict has to match on-chain arithmetic bit-for-bit.

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use std::str::FromStr;

use crate::errors::{BotError, BotResult};
use crate::utils::math::pow10;

/// Converts a human decimal value to a raw integer amount.
///
/// A value with more fractional digits than the target precision is a
/// caller error: it trips a debug assertion, and rounds down
/// deterministically in release builds.
pub fn to_raw(value: Decimal, decimals: u32) -> BotResult<U256> {
    if value.is_sign_negative() {
        return Err(BotError::DataParsing {
            context: format!("cannot convert negative amount {value} to raw units"),
            source: anyhow::anyhow!("negative amount"),
        });
    }
    debug_assert!(
        value.scale() <= decimals,
        "amount {value} has more than {decimals} fractional digits"
    );
    let scaled = value
        .checked_mul(pow10(decimals as i32))
        .ok_or_else(|| BotError::DataParsing {
            context: format!("amount {value} overflows at {decimals} decimals"),
            source: anyhow::anyhow!("decimal overflow"),
        })?;
    let units = scaled.trunc().to_u128().ok_or_else(|| BotError::DataParsing {
        context: format!("amount {value} does not fit raw u128 range"),
        source: anyhow::anyhow!("u128 overflow"),
    })?;
    Ok(U256::from(units))
}

/// Converts a raw integer amount back to a human decimal value. Exact for
/// any amount within Decimal's 28-digit mantissa.
pub fn from_raw(raw: U256, decimals: u32) -> BotResult<Decimal> {
    let integral = Decimal::from_str(&raw.to_string()).map_err(|e| BotError::DataParsing {
        context: format!("raw amount {raw} exceeds decimal range"),
        source: anyhow::anyhow!(e),
    })?;
    Ok(integral / pow10(decimals as i32))
}
