//! Append-only record storage for UNI-CHAIN.
//!
//! A store holds named streams (`economic`, `quality`, `proofs`), each a
//! sequence of opaque byte records keyed by a 1-based sequence number. The
//! ledger and proof registry decide what the bytes mean; the store only
//! guarantees order, durability, and that a record is either fully written
//! or absent.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`InMemoryRecordStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileRecordStore`] -- one length- and CRC-framed segment file per stream
//!
//! # Design Rules
//!
//! 1. Records are immutable once written; there is no update or delete.
//! 2. `append` accepts only the next sequence number, so gaps are impossible.
//! 3. A failed append leaves the stream exactly as it was.
//! 4. Streams are independent: writers on different streams never contend.
//! 5. Corruption is reported, never skipped over.

pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{FileRecordStore, FileStoreConfig, SyncMode};
pub use memory::InMemoryRecordStore;
pub use record::{DamagedFrame, StoredRecord, StreamScan};
pub use traits::RecordStore;
