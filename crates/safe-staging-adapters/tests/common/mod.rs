#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, U256};

use safe_staging_adapters::{MemoryStoreAdapter, StaticChainAdapter};
use safe_staging_core::{Operation, StagedProposal, StagingGateway, WalletTransaction};

pub const CHAIN_ID: u64 = 1;

pub type TestGateway = StagingGateway<MemoryStoreAdapter, StaticChainAdapter>;

/// Gateway serving `CHAIN_ID` plus the shared handle driving its chain.
pub fn new_gateway() -> (TestGateway, StaticChainAdapter) {
    let chain = StaticChainAdapter::new();
    let gateway =
        StagingGateway::new(MemoryStoreAdapter::new()).with_chain(CHAIN_ID, chain.clone());
    (gateway, chain)
}

pub fn safe_address() -> Address {
    "0x000000000000000000000000000000000000BEEF"
        .parse()
        .expect("valid safe address")
}

pub fn other_safe_address() -> Address {
    "0x000000000000000000000000000000000000F00D"
        .parse()
        .expect("valid safe address")
}

pub fn sample_txn(nonce: u64) -> WalletTransaction {
    WalletTransaction {
        to: "0x000000000000000000000000000000000000CAFE"
            .parse()
            .expect("valid to address"),
        value: U256::from(1_000u64),
        data: Bytes::new(),
        operation: Operation::Call,
        safe_tx_gas: U256::ZERO,
        base_gas: U256::ZERO,
        gas_price: U256::ZERO,
        gas_token: Address::ZERO,
        refund_receiver: Address::ZERO,
        nonce,
    }
}

pub fn signature_bytes(seed: u8) -> Bytes {
    let mut v = vec![seed; 65];
    v[64] = 27;
    Bytes::from(v)
}

/// `count` distinct owner signatures.
pub fn signatures(count: u8) -> Vec<Bytes> {
    (1..=count).map(signature_bytes).collect()
}

pub fn proposal(nonce: u64, sig_count: u8) -> StagedProposal {
    StagedProposal::new(sample_txn(nonce), signatures(sig_count))
}

pub fn nonces(list: &[StagedProposal]) -> Vec<u64> {
    list.iter().map(StagedProposal::nonce).collect()
}
