//! High-level SDK for UNI-CHAIN.
//!
//! [`Unichain`] is the entry point for applications embedding the trust
//! core: it appends to both ledger channels, verifies them, and generates,
//! records, and audits constraint proofs over a single store.

pub mod error;
pub mod unichain;

pub use error::{SdkError, SdkResult};
pub use unichain::{Unichain, UnichainConfig};

// Re-export key types
pub use uc_ledger::{
    BatchTrail, ChainReport, EconomicEvent, EconomicFilter, EconomicRecord, EconomicTx,
    LedgerEntry, PaymentMethod, QualityFilter, QualityRecord, QualityStage, QualityTx,
};
pub use uc_proof::{
    Evaluation, ProofConfig, ProofFilter, ProofPayload, ProofRecord, ProofType, Recorded,
};
pub use uc_store::{FileStoreConfig, SyncMode};
pub use uc_types::{ActorId, ActorRef, ActorRole, BatchId, Channel, Digest, ProofId, RecordId};
