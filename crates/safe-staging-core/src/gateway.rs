use std::collections::HashMap;

use alloy::primitives::Address;
use tracing::{debug, error, info, warn};

use crate::domain::{StagedProposal, StagingKey};
use crate::error::StagingError;
use crate::locks::KeyedLocks;
use crate::ports::{ChainPort, PortError, StagingStorePort};
use crate::rules;

/// Validates submissions against chain state and commits them to the store.
pub struct StagingGateway<S, C>
where
    S: StagingStorePort,
    C: ChainPort,
{
    store: S,
    chains: HashMap<u64, C>,
    locks: KeyedLocks,
}

impl<S, C> StagingGateway<S, C>
where
    S: StagingStorePort,
    C: ChainPort,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            chains: HashMap::new(),
            locks: KeyedLocks::new(),
        }
    }

    pub fn with_chain(mut self, chain_id: u64, chain: C) -> Self {
        self.insert_chain(chain_id, chain);
        self
    }

    pub fn insert_chain(&mut self, chain_id: u64, chain: C) {
        self.chains.insert(chain_id, chain);
    }

    pub fn supported_chains(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.chains.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keys with a submission in flight.
    pub fn locked_keys(&self) -> usize {
        self.locks.len()
    }

    /// Stored proposals for a Safe, exactly as last committed.
    pub fn list(&self, chain_id: u64, wallet: Address) -> Vec<StagedProposal> {
        self.store.get(&StagingKey::new(chain_id, wallet))
    }

    /// Accept `proposal` for the Safe at `wallet` on `chain_id`, returning the
    /// updated list. Nothing is written unless every check passes.
    pub async fn submit(
        &self,
        chain_id: u64,
        wallet: Address,
        proposal: StagedProposal,
    ) -> Result<Vec<StagedProposal>, StagingError> {
        let key = StagingKey::new(chain_id, wallet);
        let nonce = proposal.nonce();
        let sig_count = proposal.signature_count();

        let result = self.submit_inner(key, proposal).await;
        match &result {
            Ok(list) => info!(
                %key,
                nonce,
                sig_count,
                staged = list.len(),
                "staged proposal accepted"
            ),
            Err(e) if e.is_client_error() => warn!(
                %key,
                nonce,
                sig_count,
                kind = e.kind(),
                error = %e,
                "staged proposal rejected"
            ),
            Err(e) => error!(
                %key,
                nonce,
                sig_count,
                error = %e,
                "staged proposal failed on chain access"
            ),
        }
        result
    }

    async fn submit_inner(
        &self,
        key: StagingKey,
        proposal: StagedProposal,
    ) -> Result<Vec<StagedProposal>, StagingError> {
        let chain = self
            .chains
            .get(&key.chain_id)
            .ok_or(StagingError::UnsupportedChain(key.chain_id))?;
        rules::check_signature_shape(&proposal)?;

        let _guard = self.locks.acquire(&key).await;
        let existing = self.store.get(&key);
        let current_nonce = chain
            .nonce(key.wallet)
            .await
            .map_err(StagingError::InternalChainError)?;
        let placement = rules::classify(&existing, &proposal, current_nonce)?;
        debug!(
            %key,
            current_nonce,
            amendment = placement.is_amendment(),
            "submission classified"
        );

        verify_signatures(chain, key.wallet, &proposal).await?;

        let updated = rules::apply(existing, proposal, placement, current_nonce);
        self.store.put(key, updated.clone());
        Ok(updated)
    }
}

async fn verify_signatures<C: ChainPort>(
    chain: &C,
    wallet: Address,
    proposal: &StagedProposal,
) -> Result<(), StagingError> {
    let hash = match chain.transaction_hash(wallet, &proposal.txn).await {
        Ok(hash) => hash,
        Err(PortError::Reverted(reason)) => {
            return Err(StagingError::InvalidSignature(format!(
                "transaction hash rejected by wallet: {reason}"
            )))
        }
        Err(e) => return Err(StagingError::InternalChainError(e)),
    };

    let signatures = proposal.concatenated_signatures();
    let required = proposal.signature_count();
    let valid = chain
        .check_signatures(wallet, hash, &signatures, required)
        .await
        .map_err(StagingError::InternalChainError)?;
    if !valid {
        return Err(StagingError::InvalidSignature(format!(
            "wallet rejected {required} signature(s) over {hash}"
        )));
    }
    Ok(())
}
