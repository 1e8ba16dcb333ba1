use uc_crypto::EncodingError;
use uc_store::StoreError;
use uc_types::{Channel, Digest, RecordId};

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A required field is missing or malformed. Raised before any seal.
    #[error("invalid `{field}`: {reason}")]
    Validation { field: String, reason: String },

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// The channel tip moved between the caller's read and the seal.
    #[error("chain conflict on {channel}: expected tip {expected}, found {actual}")]
    ChainConflict {
        channel: Channel,
        expected: Digest,
        actual: Digest,
    },

    /// Persisted records do not form a valid chain.
    #[error("integrity failure on {channel} at record {record_id}: {reason}")]
    IntegrityFailure {
        channel: Channel,
        record_id: RecordId,
        reason: String,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("chain head lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors raised before any chain mutation was attempted.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Encoding(_))
    }
}
