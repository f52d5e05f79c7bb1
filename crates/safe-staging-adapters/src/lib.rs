pub mod abi;
pub mod config;
pub mod rpc;
pub mod static_chain;
pub mod store;

pub use config::{ConfigError, StagingConfig};
pub use rpc::RpcChainAdapter;
pub use static_chain::StaticChainAdapter;
pub use store::MemoryStoreAdapter;

use safe_staging_core::{PortError, StagingGateway};

pub type RpcGateway = StagingGateway<MemoryStoreAdapter, RpcChainAdapter>;

/// Gateway over an in-memory store with one JSON-RPC client per configured chain.
pub fn gateway_from_config(config: &StagingConfig) -> Result<RpcGateway, PortError> {
    let mut gateway = StagingGateway::new(MemoryStoreAdapter::new());
    for (chain_id, url) in &config.rpc_urls {
        gateway.insert_chain(*chain_id, RpcChainAdapter::new(url, config.rpc_timeout())?);
    }
    Ok(gateway)
}
