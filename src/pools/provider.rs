//! Quote provider over configured pools

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::info;

use crate::errors::{BotError, BotResult};
use crate::pools::venue::PoolVenue;
use crate::types::{PoolIdentity, Token};
use crate::utils::amount::{from_raw, to_raw};

/// Quotes swaps against the configured pools. `initialize` must succeed
/// before any quote call; skipping it accepts undefined behavior.
pub struct QuoteProvider {
    venue: Arc<dyn PoolVenue>,
    pools: Vec<PoolIdentity>,
}

impl QuoteProvider {
    pub fn new(venue: Arc<dyn PoolVenue>, pools: Vec<PoolIdentity>) -> Self {
        Self { venue, pools }
    }

    /// Asserts every configured pool's live coin list matches the
    /// configured tokens exactly. A mismatch is fatal at startup.
    pub async fn initialize(&self) -> BotResult<()> {
        for pool in &self.pools {
            for index in 0..2u8 {
                let expected = pool.tokens[index as usize].address;
                let actual = self.venue.coin_at(pool.address, index).await?;
                if actual != expected {
                    return Err(BotError::PoolMismatch {
                        pool: pool.address,
                        index,
                        expected,
                        actual,
                    });
                }
            }
            info!("✅ {} - coin list verified at {}", pool.name, pool.address);
        }
        Ok(())
    }

    /// Expected output for swapping `amount_in` of `token_in`. A revert or
    /// a zero output is a quote failure, not a price: zero almost always
    /// means a mis-specified coin index rather than empty liquidity.
    pub async fn quote(
        &self,
        pool: &PoolIdentity,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
    ) -> BotResult<U256> {
        let i = pool.index_of(token_in).ok_or(BotError::UnknownTokenInPool {
            pool: pool.address,
            token: token_in.address,
        })?;
        let j = pool.index_of(token_out).ok_or(BotError::UnknownTokenInPool {
            pool: pool.address,
            token: token_out.address,
        })?;

        let hop = format!("{}->{}", token_in.symbol, token_out.symbol);
        let dy = self
            .venue
            .get_dy(pool.address, i, j, amount_in)
            .await
            .map_err(|e| BotError::QuoteFailed {
                venue: pool.name.clone(),
                hop: hop.clone(),
                reason: e.to_string(),
            })?;

        if dy.is_zero() {
            return Err(BotError::QuoteFailed {
                venue: pool.name.clone(),
                hop,
                reason: "venue returned zero output".to_string(),
            });
        }
        Ok(dy)
    }

    /// Quotes one whole unit of `base_token` and reports it as a decimal
    /// price in `quote_token` per unit.
    pub async fn reference_price(
        &self,
        pool: &PoolIdentity,
        base_token: &Token,
        quote_token: &Token,
    ) -> BotResult<Decimal> {
        let unit = to_raw(dec!(1), base_token.decimals as u32)?;
        let out = self.quote(pool, base_token, quote_token, unit).await?;
        from_raw(out, quote_token.decimals as u32)
    }
}
