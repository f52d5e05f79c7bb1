//! Safe contract calls used for staging checks.

use alloy::primitives::{Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use safe_staging_core::{PortError, WalletTransaction};

sol! {
    /// Read-only subset of the Safe singleton (v1.3.0 / v1.4.1 layout).
    interface ISafe {
        function nonce() external view returns (uint256);

        function getTransactionHash(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 _nonce
        ) external view returns (bytes32);

        function checkNSignatures(
            bytes32 dataHash,
            bytes memory data,
            bytes memory signatures,
            uint256 requiredSignatures
        ) external view;
    }
}

pub fn encode_nonce() -> Bytes {
    Bytes::from(ISafe::nonceCall {}.abi_encode())
}

pub fn decode_nonce(raw: &[u8]) -> Result<U256, PortError> {
    ISafe::nonceCall::abi_decode_returns(raw, true)
        .map(|ret| ret._0)
        .map_err(|e| PortError::Decode(format!("nonce() returned {} bytes: {e}", raw.len())))
}

pub fn encode_transaction_hash(txn: &WalletTransaction) -> Bytes {
    let call = ISafe::getTransactionHashCall {
        to: txn.to,
        value: txn.value,
        data: txn.data.clone(),
        operation: txn.operation.as_u8(),
        safeTxGas: txn.safe_tx_gas,
        baseGas: txn.base_gas,
        gasPrice: txn.gas_price,
        gasToken: txn.gas_token,
        refundReceiver: txn.refund_receiver,
        _nonce: U256::from(txn.nonce),
    };
    Bytes::from(call.abi_encode())
}

pub fn decode_transaction_hash(raw: &[u8]) -> Result<B256, PortError> {
    ISafe::getTransactionHashCall::abi_decode_returns(raw, true)
        .map(|ret| ret._0)
        .map_err(|e| {
            PortError::Decode(format!(
                "getTransactionHash() returned {} bytes: {e}",
                raw.len()
            ))
        })
}

/// `data` is sent empty. Only contract (EIP-1271) owners read it, so their
/// signatures fail this check.
pub fn encode_check_signatures(hash: B256, signatures: &Bytes, required: usize) -> Bytes {
    let call = ISafe::checkNSignaturesCall {
        dataHash: hash,
        data: Bytes::new(),
        signatures: signatures.clone(),
        requiredSignatures: U256::from(required),
    };
    Bytes::from(call.abi_encode())
}

pub fn selector_of(calldata: &[u8]) -> Option<[u8; 4]> {
    calldata.get(..4).map(|s| {
        let mut out = [0u8; 4];
        out.copy_from_slice(s);
        out
    })
}

pub const NONCE_SELECTOR: [u8; 4] = ISafe::nonceCall::SELECTOR;
pub const TRANSACTION_HASH_SELECTOR: [u8; 4] = ISafe::getTransactionHashCall::SELECTOR;
pub const CHECK_SIGNATURES_SELECTOR: [u8; 4] = ISafe::checkNSignaturesCall::SELECTOR;
