//! Issuer contract fee lookups
//!
//! Fee schedules are read live from the contract every simulation. Hardcoded
//! fee constants drift out of sync with on-chain parameters, so the getters
//! are the single source of truth.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol_types::SolValue,
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::{BotError, BotResult};
use crate::utils::abi::encode_call;
use crate::ConcreteProvider;

#[async_trait]
pub trait IssuerVenue: Send + Sync {
    async fn mint_fee_bps(&self) -> BotResult<u32>;
    async fn redeem_fee_bps(&self) -> BotResult<u32>;
}

pub struct ChainIssuer {
    provider: Arc<ConcreteProvider>,
    address: Address,
}

impl ChainIssuer {
    pub fn new(provider: Arc<ConcreteProvider>, address: Address) -> Self {
        Self { provider, address }
    }

    async fn read_bps(&self, signature: &str) -> BotResult<u32> {
        let data = encode_call(signature, &[]);
        let tx = TransactionRequest::default().to(self.address).input(data.into());
        let raw = self.provider.call(&tx).await.map_err(|e| BotError::Network {
            message: format!("{signature} call to issuer {} failed: {e}", self.address),
            source: Some(anyhow::anyhow!(e)),
            retry_count: 0,
        })?;
        let bps = U256::abi_decode(&raw, true).map_err(|e| BotError::DataParsing {
            context: format!("decoding {signature} of issuer {}", self.address),
            source: anyhow::anyhow!(e),
        })?;
        bps.try_into().map_err(|_| BotError::DataParsing {
            context: format!("issuer {signature} out of u32 range"),
            source: anyhow::anyhow!("fee overflow"),
        })
    }
}

#[async_trait]
impl IssuerVenue for ChainIssuer {
    async fn mint_fee_bps(&self) -> BotResult<u32> {
        self.read_bps("mintFeeBps()").await
    }

    async fn redeem_fee_bps(&self) -> BotResult<u32> {
        self.read_bps("redeemFeeBps()").await
    }
}
