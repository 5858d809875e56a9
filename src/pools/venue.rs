//! On-chain pool venue access

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol_types::SolValue,
};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{BotError, BotResult};
use crate::utils::abi::encode_call;
use crate::ConcreteProvider;

/// Read-only surface of a constant-function pool.
#[async_trait]
pub trait PoolVenue: Send + Sync {
    /// The coin address registered at `index` (0 or 1).
    async fn coin_at(&self, pool: Address, index: u8) -> BotResult<Address>;

    /// Expected output of swapping `dx` of coin `i` for coin `j`.
    async fn get_dy(&self, pool: Address, i: u8, j: u8, dx: U256) -> BotResult<U256>;
}

/// Pool venue backed by live read calls against the RPC provider.
pub struct ChainPool {
    provider: Arc<ConcreteProvider>,
}

impl ChainPool {
    pub fn new(provider: Arc<ConcreteProvider>) -> Self {
        Self { provider }
    }

    async fn call(&self, pool: Address, data: Vec<u8>, what: &str) -> BotResult<Vec<u8>> {
        let tx = TransactionRequest::default().to(pool).input(data.into());
        let bytes = self.provider.call(&tx).await.map_err(|e| BotError::Network {
            message: format!("{what} call to pool {pool} failed: {e}"),
            source: Some(anyhow::anyhow!(e)),
            retry_count: 0,
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PoolVenue for ChainPool {
    async fn coin_at(&self, pool: Address, index: u8) -> BotResult<Address> {
        debug!("Fetching coins({}) for pool {}", index, pool);
        let data = encode_call("coins(uint256)", &[U256::from(index)]);
        let raw = self.call(pool, data, "coins").await?;
        Address::abi_decode(&raw, true).map_err(|e| BotError::DataParsing {
            context: format!("decoding coins({index}) of pool {pool}"),
            source: anyhow::anyhow!(e),
        })
    }

    async fn get_dy(&self, pool: Address, i: u8, j: u8, dx: U256) -> BotResult<U256> {
        let data = encode_call(
            "get_dy(int128,int128,uint256)",
            &[U256::from(i), U256::from(j), dx],
        );
        let raw = self.call(pool, data, "get_dy").await?;
        U256::abi_decode(&raw, true)
            .context("decoding get_dy output")
            .map_err(|e| BotError::DataParsing {
                context: format!("decoding get_dy({i},{j}) of pool {pool}"),
                source: e,
            })
    }
}
