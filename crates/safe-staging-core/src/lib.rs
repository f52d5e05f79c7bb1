pub mod domain;
pub mod error;
pub mod gateway;
pub mod locks;
pub mod ports;
pub mod rules;

pub use domain::{parse_u256, Operation, StagedProposal, StagingKey, WalletTransaction};
pub use error::StagingError;
pub use gateway::StagingGateway;
pub use locks::{KeyGuard, KeyedLocks};
pub use ports::{ChainPort, PortError, StagingStorePort};
pub use rules::Placement;
