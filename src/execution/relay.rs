//! Transaction relay seams
//!
//! `Relay` is the pipeline's only route to the chain for write-path
//! operations, so the whole pipeline can be driven against a fake in tests.

use alloy::{providers::Provider, rpc::types::eth::TransactionRequest};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use alloy::primitives::Address;

use crate::config::EXECUTION_TIMEOUT_SECS;
use crate::errors::{BotError, BotResult};
use crate::types::{PrecheckOutcome, Resolution};
use crate::ConcreteProvider;

#[async_trait]
pub trait Relay: Send + Sync {
    /// Dry run of the transaction against the pending block.
    async fn precheck(&self, tx: &TransactionRequest) -> BotResult<PrecheckOutcome>;

    /// Broadcasts the transaction. The returned handle resolves once the
    /// inclusion window has passed, one way or the other.
    async fn submit(&self, tx: TransactionRequest) -> BotResult<Box<dyn ResolutionHandle>>;

    async fn next_nonce(&self, signer: Address) -> BotResult<u64>;
}

#[async_trait]
pub trait ResolutionHandle: Send {
    async fn wait(self: Box<Self>) -> BotResult<Resolution>;
}

struct FutureHandle {
    fut: Pin<Box<dyn Future<Output = BotResult<Resolution>> + Send>>,
}

#[async_trait]
impl ResolutionHandle for FutureHandle {
    async fn wait(self: Box<Self>) -> BotResult<Resolution> {
        self.fut.await
    }
}

/// Relay backed by the live RPC provider.
pub struct ProviderRelay {
    provider: Arc<ConcreteProvider>,
    inclusion_timeout: Duration,
}

impl ProviderRelay {
    pub fn new(provider: Arc<ConcreteProvider>) -> Self {
        Self {
            provider,
            inclusion_timeout: Duration::from_secs(EXECUTION_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl Relay for ProviderRelay {
    async fn precheck(&self, tx: &TransactionRequest) -> BotResult<PrecheckOutcome> {
        match self.provider.call(tx).await {
            Ok(_) => Ok(PrecheckOutcome::Success),
            Err(e) => {
                let reason = e.to_string();
                // eth_call surfaces reverts as errors; transport faults
                // look different and are handled as retryable
                if reason.to_lowercase().contains("revert") {
                    Ok(PrecheckOutcome::Revert { reason })
                } else {
                    Ok(PrecheckOutcome::Error { reason })
                }
            }
        }
    }

    async fn submit(&self, tx: TransactionRequest) -> BotResult<Box<dyn ResolutionHandle>> {
        let pending = match self.provider.send_transaction(tx).await {
            Ok(pending) => pending,
            Err(e) => {
                let reason = e.to_string();
                if reason.to_lowercase().contains("nonce") {
                    warn!("Submission hit a nonce conflict: {}", reason);
                    let fut = async move { Ok(Resolution::NonceConflict) };
                    return Ok(Box::new(FutureHandle { fut: Box::pin(fut) }));
                }
                return Err(BotError::Network {
                    message: format!("transaction submission failed: {reason}"),
                    source: Some(anyhow::anyhow!(reason)),
                    retry_count: 0,
                });
            }
        };

        let tx_hash = format!("{:?}", pending.tx_hash());
        info!("📡 Transaction sent: {}", tx_hash);

        let timeout = self.inclusion_timeout;
        let fut = async move {
            tokio::select! {
                result = pending.get_receipt() => match result {
                    Ok(receipt) => Ok(Resolution::Included {
                        success: receipt.status(),
                        tx_hash: format!("{:?}", receipt.transaction_hash),
                    }),
                    Err(e) => {
                        warn!("Receipt watch failed for {}: {}", tx_hash, e);
                        Ok(Resolution::NotIncluded)
                    }
                },
                _ = tokio::time::sleep(timeout) => {
                    warn!("No inclusion for {} within {:?}", tx_hash, timeout);
                    Ok(Resolution::NotIncluded)
                }
            }
        };
        Ok(Box::new(FutureHandle { fut: Box::pin(fut) }))
    }

    async fn next_nonce(&self, signer: Address) -> BotResult<u64> {
        self.provider
            .get_transaction_count(signer)
            .await
            .map_err(|e| BotError::Network {
                message: format!("nonce lookup for {signer} failed: {e}"),
                source: Some(anyhow::anyhow!(e)),
                retry_count: 0,
            })
    }
}
