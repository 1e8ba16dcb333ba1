use uc_crypto::EncodingError;
use uc_store::StoreError;

use crate::claim::Violation;

/// Errors from proof generation and the proof registry.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The payload is structurally malformed; no constraint was evaluated.
    #[error("invalid `{field}`: {reason}")]
    InvalidPayload { field: String, reason: String },

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// A constraint predicate failed. This is a normal rejection outcome.
    #[error("constraint violation: {0}")]
    ConstraintViolation(Violation),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The persisted proof stream is inconsistent.
    #[error("corrupt proof stream at position {seq}: {reason}")]
    CorruptStream { seq: u64, reason: String },

    #[error("proof registry lock poisoned")]
    LockPoisoned,
}

impl ProofError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The violated sub-check, when this is a constraint rejection.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::ConstraintViolation(v) => Some(v),
            _ => None,
        }
    }
}
