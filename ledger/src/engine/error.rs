use overdrive_types::{DuplicateKey, PreconditionFailed, ValidationError};
use thiserror::Error;

/// Operation failure. Every kind is local to a single invocation and implies
/// no numeric field was mutated.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input, rejected before any state was read.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    /// Precondition did not hold at the moment of application.
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionFailed),
    /// Unknown account or withdrawal request.
    #[error("not found")]
    NotFound,
    /// Registration collision on display name or derived account number.
    #[error("duplicate key: {0}")]
    Duplicate(#[from] DuplicateKey),
    /// Underlying persistence failure. Not retried by the engine.
    #[error("storage unavailable: {0}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}
