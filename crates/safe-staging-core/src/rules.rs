//! Acceptance rules for staged proposals.
//!
//! Everything here is pure: the gateway feeds in the stored list and the
//! on-chain nonce, and commits whatever comes back.

use crate::domain::{StagedProposal, WalletTransaction};
use crate::error::StagingError;

/// Where an accepted submission lands in the stored list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First time this transaction is seen.
    Append,
    /// More signatures for the proposal at this index.
    Replace(usize),
}

impl Placement {
    pub fn is_amendment(self) -> bool {
        matches!(self, Placement::Replace(_))
    }
}

pub fn find_match(existing: &[StagedProposal], txn: &WalletTransaction) -> Option<usize> {
    existing.iter().position(|p| &p.txn == txn)
}

pub fn classify(
    existing: &[StagedProposal],
    proposal: &StagedProposal,
    current_nonce: u64,
) -> Result<Placement, StagingError> {
    match find_match(existing, &proposal.txn) {
        Some(idx) => {
            let staged = existing[idx].signature_count();
            let submitted = proposal.signature_count();
            if submitted <= staged {
                return Err(StagingError::SignatureCountNotIncreased { submitted, staged });
            }
            Ok(Placement::Replace(idx))
        }
        None => {
            let proposed = proposal.nonce();
            if proposed < current_nonce {
                return Err(StagingError::NonceTooLow {
                    proposed,
                    current: current_nonce,
                });
            }
            // Future nonces must chain back to the current one through staged entries.
            if proposed > current_nonce && !existing.iter().any(|p| p.nonce() == proposed - 1) {
                return Err(StagingError::NonceGapDetected {
                    proposed,
                    current: current_nonce,
                });
            }
            Ok(Placement::Append)
        }
    }
}

/// Drop proposals the chain has already executed past.
pub fn prune(proposals: &mut Vec<StagedProposal>, current_nonce: u64) {
    proposals.retain(|p| p.nonce() >= current_nonce);
}

pub fn apply(
    mut existing: Vec<StagedProposal>,
    proposal: StagedProposal,
    placement: Placement,
    current_nonce: u64,
) -> Vec<StagedProposal> {
    match placement {
        Placement::Append => existing.push(proposal),
        Placement::Replace(idx) => existing[idx] = proposal,
    }
    prune(&mut existing, current_nonce);
    existing
}

/// Checks that need no chain access: at least one signature, none empty.
pub fn check_signature_shape(proposal: &StagedProposal) -> Result<(), StagingError> {
    if proposal.sigs.is_empty() {
        return Err(StagingError::InvalidSignature(
            "submission carries no signatures".to_owned(),
        ));
    }
    if let Some(pos) = proposal.sigs.iter().position(|s| s.is_empty()) {
        return Err(StagingError::InvalidSignature(format!(
            "signature {pos} is empty"
        )));
    }
    Ok(())
}
