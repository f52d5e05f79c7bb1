use thiserror::Error;

use crate::ports::PortError;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("unsupported chain {0}")]
    UnsupportedChain(u64),
    #[error("nonce too low: proposal nonce {proposed} is below on-chain nonce {current}")]
    NonceTooLow { proposed: u64, current: u64 },
    #[error(
        "nonce gap detected: proposal nonce {proposed} has no staged predecessor \
         (on-chain nonce {current})"
    )]
    NonceGapDetected { proposed: u64, current: u64 },
    #[error("signature count not increased: submitted {submitted}, already staged {staged}")]
    SignatureCountNotIncreased { submitted: usize, staged: usize },
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("chain error: {0}")]
    InternalChainError(#[source] PortError),
}

impl StagingError {
    /// Rejections the caller has to fix before resubmitting.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StagingError::InternalChainError(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StagingError::UnsupportedChain(_) => "UnsupportedChain",
            StagingError::NonceTooLow { .. } => "NonceTooLow",
            StagingError::NonceGapDetected { .. } => "NonceGapDetected",
            StagingError::SignatureCountNotIncreased { .. } => "SignatureCountNotIncreased",
            StagingError::InvalidSignature(_) => "InvalidSignature",
            StagingError::InternalChainError(_) => "InternalChainError",
        }
    }
}
