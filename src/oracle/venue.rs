//! On-chain oracle venue access

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

/// One round of a push-style price feed, as reported by the contract.
#[derive(Debug, Clone, Copy)]
pub struct OracleRound {
    pub round_id: u64,
    pub answer: U256,
    pub updated_at: u64,
}

#[async_trait]
pub trait OracleVenue: Send + Sync {
    async fn latest_round(&self, oracle: Address) -> BotResult<OracleRound>;
    async fn decimals(&self, oracle: Address) -> BotResult<u8>;
}

pub struct ChainOracle {
    provider: Arc<ConcreteProvider>,
}

impl ChainOracle {
    pub fn new(provider: Arc<ConcreteProvider>) -> Self {
        Self { provider }
    }

    async fn call(&self, oracle: Address, data: Vec<u8>, what: &str) -> BotResult<Vec<u8>> {
        let tx = TransactionRequest::default().to(oracle).input(data.into());
        let bytes = self.provider.call(&tx).await.map_err(|e| BotError::OracleRead {
            oracle,
            reason: format!("{what} call failed: {e}"),
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl OracleVenue for ChainOracle {
    async fn latest_round(&self, oracle: Address) -> BotResult<OracleRound> {
        let data = encode_call("latestRoundData()", &[]);
        let raw = self.call(oracle, data, "latestRoundData").await?;
        // (roundId, answer, startedAt, updatedAt, answeredInRound)
        let decoded = <(U256, U256, U256, U256, U256)>::abi_decode(&raw, true)
            .map_err(|e| BotError::DataParsing {
                context: format!("decoding latestRoundData of {oracle}"),
                source: anyhow::anyhow!(e),
            })?;
        Ok(OracleRound {
            round_id: decoded.0.try_into().unwrap_or(u64::MAX),
            answer: decoded.1,
            updated_at: decoded.3.try_into().unwrap_or(0),
        })
    }

    async fn decimals(&self, oracle: Address) -> BotResult<u8> {
        let data = encode_call("decimals()", &[]);
        let raw = self.call(oracle, data, "decimals").await?;
        let decimals = U256::abi_decode(&raw, true).map_err(|e| BotError::DataParsing {
            context: format!("decoding decimals of {oracle}"),
            source: anyhow::anyhow!(e),
        })?;
        Ok(decimals.try_into().unwrap_or(18))
    }
}
