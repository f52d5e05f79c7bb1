use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256};
use serde_json::Value;
use tracing::debug;

use safe_staging_core::{ChainPort, PortError, WalletTransaction};

use crate::abi;

/// JSON-RPC `eth_call` client for one chain's node.
#[derive(Debug)]
pub struct RpcChainAdapter {
    endpoint: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcChainAdapter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build rpc client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn eth_call(&self, wallet: Address, calldata: Bytes) -> Result<Bytes, PortError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": wallet, "data": calldata }, "latest"],
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("rpc request failed: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortError::Transport(format!("rpc response read failed: {e}")))?;
        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(PortError::Decode(format!("rpc json decode failed: {e}")))
            }
            Err(_) => return Err(PortError::Transport(format!("rpc status {status}"))),
        };
        if let Some(err) = body.get("error") {
            return Err(rpc_error(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!("rpc status {status}: {body}")));
        }
        let raw = body
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| PortError::Decode("rpc response missing result".to_owned()))?;
        raw.parse()
            .map_err(|e| PortError::Decode(format!("invalid result hex: {e}")))
    }
}

fn rpc_error(err: &Value) -> PortError {
    let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown rpc error")
        .to_owned();
    // Geth reports reverts as code 3; other clients only say so in the message.
    if code == 3 || message.to_ascii_lowercase().contains("revert") {
        PortError::Reverted(message)
    } else {
        PortError::Rpc { code, message }
    }
}

impl ChainPort for RpcChainAdapter {
    async fn nonce(&self, wallet: Address) -> Result<u64, PortError> {
        let raw = self.eth_call(wallet, abi::encode_nonce()).await?;
        let nonce = abi::decode_nonce(&raw)?;
        u64::try_from(nonce).map_err(|_| PortError::Decode(format!("nonce {nonce} exceeds u64")))
    }

    async fn transaction_hash(
        &self,
        wallet: Address,
        txn: &WalletTransaction,
    ) -> Result<B256, PortError> {
        let raw = self
            .eth_call(wallet, abi::encode_transaction_hash(txn))
            .await?;
        abi::decode_transaction_hash(&raw)
    }

    async fn check_signatures(
        &self,
        wallet: Address,
        hash: B256,
        signatures: &Bytes,
        required: usize,
    ) -> Result<bool, PortError> {
        let calldata = abi::encode_check_signatures(hash, signatures, required);
        match self.eth_call(wallet, calldata).await {
            Ok(_) => Ok(true),
            Err(PortError::Reverted(reason)) => {
                debug!(%wallet, %hash, required, %reason, "checkNSignatures reverted");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
