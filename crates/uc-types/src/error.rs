use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown actor role: {0}")]
    UnknownRole(String),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    #[error("invalid record id: {0}")]
    InvalidRecordId(String),
}
