//! TTL-cached oracle fetcher and the issuer's oracle-adjustment math

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{BotError, BotResult};
use crate::oracle::venue::OracleVenue;
use crate::types::OracleReading;
use crate::utils::amount::from_raw;

struct CacheEntry {
    reading: OracleReading,
    fetched_at: Instant,
}

/// Fetches and caches oracle readings. The cache map is the only shared
/// mutable state here; entries are replaced whole under the write lock, so
/// readers never observe a torn entry.
pub struct OracleFetcher {
    venue: Arc<dyn OracleVenue>,
    cache: RwLock<HashMap<Address, CacheEntry>>,
    cache_ttl: Duration,
    stale_threshold: Duration,
    tolerance_band: Decimal,
}

impl OracleFetcher {
    pub fn new(
        venue: Arc<dyn OracleVenue>,
        cache_ttl: Duration,
        stale_threshold: Duration,
        tolerance_band_pct: Decimal,
    ) -> Self {
        Self {
            venue,
            cache: RwLock::new(HashMap::new()),
            cache_ttl,
            stale_threshold,
            tolerance_band: tolerance_band_pct / dec!(100),
        }
    }

    /// Returns the cached reading when younger than the TTL, otherwise
    /// performs a fresh fetch and replaces the cache entry atomically.
    pub async fn get_price(&self, oracle: Address, use_cache: bool) -> BotResult<OracleReading> {
        if use_cache {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&oracle) {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    debug!("Oracle {} served from cache", oracle);
                    return Ok(entry.reading.clone());
                }
            }
        }

        let round = self.venue.latest_round(oracle).await?;
        let decimals = self.venue.decimals(oracle).await?;
        let price = from_raw(round.answer, decimals as u32)?;
        if price <= dec!(0) {
            return Err(BotError::OracleRead {
                oracle,
                reason: format!("non-positive price {price}"),
            });
        }

        let updated_at = DateTime::<Utc>::from_timestamp(round.updated_at as i64, 0)
            .ok_or_else(|| BotError::OracleRead {
                oracle,
                reason: format!("invalid update timestamp {}", round.updated_at),
            })?;
        let age = Utc::now().signed_duration_since(updated_at);
        let reading = OracleReading {
            price,
            source_decimals: decimals,
            updated_at,
            round_id: round.round_id,
            is_stale: age.num_seconds() > self.stale_threshold.as_secs() as i64,
        };

        let mut cache = self.cache.write().await;
        cache.insert(oracle, CacheEntry {
            reading: reading.clone(),
            fetched_at: Instant::now(),
        });
        Ok(reading)
    }

    /// Mirrors the issuer's on-chain revert bound exactly: any asymmetry
    /// between this predicate and the contract produces simulations that
    /// pass here and revert there.
    pub fn is_within_tolerance(&self, price: Decimal) -> bool {
        let lower = dec!(1.0) - self.tolerance_band;
        let upper = dec!(1.0) + self.tolerance_band;
        lower <= price && price <= upper
    }
}

/// Issuer mint adjustment: a below-peg oracle haircuts the minted amount,
/// an at-or-above-peg oracle leaves it untouched.
pub fn mint_output_after_oracle(input: Decimal, price: Decimal) -> Decimal {
    if price >= dec!(1.0) {
        input
    } else {
        input * price
    }
}

/// Issuer redeem adjustment: the mirror image, deliberately asymmetric with
/// mint so both directions favor the peg.
pub fn redeem_output_after_oracle(input: Decimal, price: Decimal) -> Decimal {
    if price <= dec!(1.0) {
        input
    } else {
        input / price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockOracleVenue;

    fn fetcher(venue: Arc<MockOracleVenue>) -> OracleFetcher {
        OracleFetcher::new(venue, Duration::from_secs(60), Duration::from_secs(86_400), dec!(1))
    }

    #[test]
    fn peg_price_has_no_impact_either_direction() {
        assert_eq!(mint_output_after_oracle(dec!(500), dec!(1.0)), dec!(500));
        assert_eq!(redeem_output_after_oracle(dec!(500), dec!(1.0)), dec!(500));
    }

    #[test]
    fn mint_haircuts_below_peg_only() {
        assert_eq!(mint_output_after_oracle(dec!(100), dec!(0.98)), dec!(98));
        assert_eq!(mint_output_after_oracle(dec!(100), dec!(1.05)), dec!(100));
    }

    #[test]
    fn redeem_haircuts_above_peg_only() {
        let out = redeem_output_after_oracle(dec!(100), dec!(1.02));
        assert!((out - dec!(98.0392156862745098)).abs() < dec!(0.000001));
        assert_eq!(redeem_output_after_oracle(dec!(100), dec!(0.97)), dec!(100));
    }

    #[tokio::test]
    async fn tolerance_band_is_inclusive_and_symmetric() {
        let venue = Arc::new(MockOracleVenue::new(dec!(1.0)));
        let fetcher = fetcher(venue);
        assert!(fetcher.is_within_tolerance(dec!(0.99)));
        assert!(fetcher.is_within_tolerance(dec!(1.01)));
        assert!(!fetcher.is_within_tolerance(dec!(1.0101)));
        assert!(!fetcher.is_within_tolerance(dec!(0.9899)));
        assert!(!fetcher.is_within_tolerance(dec!(1.02)));
    }

    #[tokio::test]
    async fn cached_reading_is_served_within_ttl() {
        let venue = Arc::new(MockOracleVenue::new(dec!(1.005)));
        let oracle = Address::repeat_byte(0x66);
        let fetcher = fetcher(venue.clone());

        let first = fetcher.get_price(oracle, true).await.unwrap();
        venue.set_price(dec!(0.95));
        let second = fetcher.get_price(oracle, true).await.unwrap();
        assert_eq!(first.price, second.price);

        let fresh = fetcher.get_price(oracle, false).await.unwrap();
        assert_eq!(fresh.price, dec!(0.95));
    }

    #[tokio::test]
    async fn old_update_timestamp_is_flagged_stale() {
        let venue = Arc::new(MockOracleVenue::new(dec!(1.0)));
        venue.set_updated_at(Utc::now().timestamp() - 2 * 86_400);
        let fetcher = fetcher(venue);
        let reading = fetcher.get_price(Address::repeat_byte(0x66), false).await.unwrap();
        assert!(reading.is_stale);
    }
}
