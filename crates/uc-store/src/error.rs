/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An append did not carry the next sequence number for its stream.
    #[error("sequence gap in stream `{stream}`: expected {expected}, got {actual}")]
    SequenceGap {
        stream: String,
        expected: u64,
        actual: u64,
    },

    /// A persisted frame failed its checksum or could not be decoded.
    #[error("corrupt record {seq} in stream `{stream}` at byte offset {offset}: {reason}")]
    CorruptRecord {
        stream: String,
        /// 1-based position of the damaged frame.
        seq: u64,
        offset: u64,
        reason: String,
    },

    /// Stream names must be non-empty `[a-z0-9_-]`.
    #[error("invalid stream name: {0:?}")]
    InvalidStream(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) fn validate_stream(stream: &str) -> StoreResult<()> {
    let valid = !stream.is_empty()
        && stream
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidStream(stream.to_string()))
    }
}
