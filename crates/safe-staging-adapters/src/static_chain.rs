use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};

use safe_staging_core::{ChainPort, PortError, WalletTransaction};

use crate::abi;

/// Length of one ECDSA owner signature (r, s, v).
const SIGNATURE_LEN: usize = 65;

/// Deterministic in-process chain for tests and local runs.
///
/// Nonces are set by hand, hashes are keccak over the wallet and the
/// `getTransactionHash` calldata, and a signature blob passes when it holds
/// at least `required` 65-byte signatures. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct StaticChainAdapter {
    state: Arc<Mutex<StaticChainState>>,
}

#[derive(Debug, Default)]
struct StaticChainState {
    nonces: HashMap<Address, u64>,
    reject_signatures: bool,
    revert_hash: bool,
    fail_signature_check: bool,
    offline: bool,
    latency: Duration,
    calls: Vec<&'static str>,
}

impl StaticChainAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_nonce(&self, wallet: Address, nonce: u64) {
        self.with_state(|s| {
            s.nonces.insert(wallet, nonce);
        });
    }

    /// Make every signature check fail as a contract revert would.
    pub fn reject_signatures(&self, reject: bool) {
        self.with_state(|s| s.reject_signatures = reject);
    }

    /// Make `getTransactionHash` revert, as a Safe does for a malformed payload.
    pub fn revert_hash(&self, revert: bool) {
        self.with_state(|s| s.revert_hash = revert);
    }

    /// Make only the signature check fail with a transport error.
    pub fn fail_signature_check(&self, fail: bool) {
        self.with_state(|s| s.fail_signature_check = fail);
    }

    /// Make every call fail with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.with_state(|s| s.offline = offline);
    }

    /// Delay applied to each nonce read.
    pub fn set_latency(&self, latency: Duration) {
        self.with_state(|s| s.latency = latency);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn expected_hash(wallet: Address, txn: &WalletTransaction) -> B256 {
        let calldata = abi::encode_transaction_hash(txn);
        let mut preimage = Vec::with_capacity(20 + calldata.len());
        preimage.extend_from_slice(wallet.as_slice());
        preimage.extend_from_slice(&calldata);
        keccak256(preimage)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut StaticChainState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn record(&self, call: &'static str) -> Result<(), PortError> {
        self.with_state(|s| {
            s.calls.push(call);
            if s.offline {
                Err(PortError::Transport("static chain offline".to_owned()))
            } else {
                Ok(())
            }
        })
    }
}

impl ChainPort for StaticChainAdapter {
    async fn nonce(&self, wallet: Address) -> Result<u64, PortError> {
        let latency = self.with_state(|s| s.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.record("nonce")?;
        Ok(self.with_state(|s| s.nonces.get(&wallet).copied().unwrap_or_default()))
    }

    async fn transaction_hash(
        &self,
        wallet: Address,
        txn: &WalletTransaction,
    ) -> Result<B256, PortError> {
        self.record("transaction_hash")?;
        if self.with_state(|s| s.revert_hash) {
            return Err(PortError::Reverted("GS013".to_owned()));
        }
        Ok(Self::expected_hash(wallet, txn))
    }

    async fn check_signatures(
        &self,
        _wallet: Address,
        _hash: B256,
        signatures: &Bytes,
        required: usize,
    ) -> Result<bool, PortError> {
        self.record("check_signatures")?;
        let (reject, fail) = self.with_state(|s| (s.reject_signatures, s.fail_signature_check));
        if fail {
            return Err(PortError::Transport("static chain dropped the call".to_owned()));
        }
        if reject {
            return Ok(false);
        }
        Ok(required > 0 && signatures.len() >= required * SIGNATURE_LEN)
    }
}
