use std::future::Future;

use alloy::primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::domain::{StagedProposal, StagingKey, WalletTransaction};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("execution reverted: {0}")]
    Reverted(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only view of a Safe contract on one chain.
pub trait ChainPort: Send + Sync {
    /// Current on-chain nonce of the Safe.
    fn nonce(&self, wallet: Address) -> impl Future<Output = Result<u64, PortError>> + Send;

    /// The Safe's own `getTransactionHash` for `txn`.
    fn transaction_hash(
        &self,
        wallet: Address,
        txn: &WalletTransaction,
    ) -> impl Future<Output = Result<B256, PortError>> + Send;

    /// Whether `signatures` holds `required` valid owner signatures over `hash`.
    ///
    /// A rejection by the contract is `Ok(false)`; `Err` is reserved for
    /// failures to reach or understand the node.
    fn check_signatures(
        &self,
        wallet: Address,
        hash: B256,
        signatures: &Bytes,
        required: usize,
    ) -> impl Future<Output = Result<bool, PortError>> + Send;
}

/// Per-key proposal storage. Callers serialize writers per key.
pub trait StagingStorePort: Send + Sync {
    fn get(&self, key: &StagingKey) -> Vec<StagedProposal>;
    fn put(&self, key: StagingKey, proposals: Vec<StagedProposal>);
}
