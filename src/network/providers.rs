//! Network provider setup, gas price, and fiat price fetching

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::{
    config::Config,
    errors::{BotError, BotResult},
    network::retry::{retry_with_backoff, RetryConfig},
    ConcreteProvider,
};

const NATIVE_PRICE_API: &str = "https://api.binance.com";

/// Gas pricing context for one polling cycle. Fetched once per cycle and
/// passed into every candidate simulation so they share a consistent view.
#[derive(Debug, Clone, Copy)]
pub struct GasContext {
    pub gas_price_wei: u128,
    pub native_usd: Decimal,
}

pub async fn setup_provider(config: &Config) -> Result<Arc<ConcreteProvider>> {
    let rpc_url = config.rpc_url.as_ref()
        .context("RPC_URL is required")?;

    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(rpc_url.parse()?)
            .boxed()
    );

    info!("🔗 Testing RPC connection...");
    let block = retry_with_backoff(
        || async {
            provider.get_block_number().await
                .context("Failed to get block number")
        },
        &RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10000,
            exponential_base: 2.0,
        },
        "RPC connection",
    ).await
    .map_err(|e| {
        warn!("⚠️ Network connection attempt failed: {}", e);
        anyhow::anyhow!("Network connection failed: {}", e)
    })?;

    info!("✅ Connected at block {}", block);
    Ok(provider)
}

/// Current gas price plus the native currency's fiat price, from the
/// static config override when present, otherwise a live fetch.
pub async fn fetch_gas_context(
    provider: &Arc<ConcreteProvider>,
    config: &Config,
) -> BotResult<GasContext> {
    let gas_price_wei = retry_with_backoff(
        || async {
            provider.get_gas_price().await
                .context("Failed to fetch gas price")
        },
        &RetryConfig::default(),
        "gas price fetch",
    ).await?;

    let native_usd = match config.native_usd_price {
        Some(price) => price,
        None => fetch_native_usd_price(NATIVE_PRICE_API).await?,
    };

    Ok(GasContext { gas_price_wei, native_usd })
}

/// Fetches the native currency's USD price from a ticker endpoint.
pub async fn fetch_native_usd_price(base_url: &str) -> BotResult<Decimal> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| BotError::Network {
            message: "Failed to build HTTP client".to_string(),
            source: Some(e.into()),
            retry_count: 0,
        })?;

    let url = format!("{}/api/v3/ticker/price?symbol=ETHUSDC", base_url);

    let operation = || async {
        let response = client
            .get(&url)
            .send()
            .await
            .context("HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("⚠️ Price API returned error status {}: {}", status, body);
            return Err(anyhow::anyhow!("Price API error: {} - {}", status, body));
        }

        let json: serde_json::Value = response.json().await
            .context("Failed to parse JSON response")?;

        let price_str = json["price"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'price' field in response"))?;

        let price = Decimal::from_str(price_str)
            .context("Failed to parse price string")?;

        Ok(price)
    };

    let price = retry_with_backoff(
        operation,
        &RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 200,
            ..Default::default()
        },
        "native fiat price fetch",
    ).await?;

    if price <= dec!(0) || price > dec!(100000) {
        warn!("⚠️ Invalid native price received: {}", price);
        return Err(BotError::DataParsing {
            context: format!("native fiat price {price} outside valid range"),
            source: anyhow::anyhow!("price validation failed"),
        });
    }

    Ok(price)
}
