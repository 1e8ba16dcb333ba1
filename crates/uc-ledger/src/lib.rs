//! Append-only, hash-chained ledger for UNI-CHAIN.
//!
//! This crate is the trust core's record keeper. It provides:
//! - Economic and Quality record types with canonical hashing
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `HashChainBuilder`, the sole owner of each channel's chain head
//! - `Ledger`, the store-backed implementation with restart recovery
//! - Chain verification over persisted bytes
//! - The batch trail projection

pub mod chain;
pub mod error;
pub mod ledger;
pub mod projection;
pub mod query;
pub mod records;
pub mod traits;
pub mod validation;
pub mod verify;

pub use chain::{ChainHead, HashChainBuilder, Slot};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use projection::{BatchTrail, TrailEntry};
pub use query::{EconomicFilter, QualityFilter};
pub use records::{
    ChannelPayload, EconomicEvent, EconomicRecord, EconomicTx, LedgerEntry, PaymentMethod,
    QualityRecord, QualityStage, QualityTx, Record,
};
pub use traits::{LedgerReader, LedgerWriter};
pub use verify::{ChainFailure, ChainReport, FailureKind};
