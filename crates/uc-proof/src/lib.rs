//! Constraint proofs for UNI-CHAIN.
//!
//! A proof attests that private inputs (sensor readings, payment amounts, a
//! GPS trace) satisfy a constraint family without publishing them. The
//! engine hashes the canonical inputs into a commitment, evaluates every
//! sub-check, and emits a [`ProofRecord`] holding only the commitment and
//! the public [`Claim`]. Anyone holding the original inputs can later
//! [`recompute`](ProofRegistry::recompute) the proof.
//!
//! Commitments are plain domain-separated hashes; there is no
//! zero-knowledge circuit behind them.

pub mod claim;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod payload;
pub mod record;
pub mod registry;

pub use claim::{CheckResult, Claim, ClaimDetail, Violation};
pub use config::{EconomicBounds, ProofConfig, QualityBounds, RouteBounds, ValueRange};
pub use engine::{Evaluation, ProofEngine};
pub use error::ProofError;
pub use payload::{
    BoundingBox, EconomicPayload, GeoPoint, ProofPayload, ProofType, QualityPayload,
    RoutePayload, SensorReading,
};
pub use record::{ProofKey, ProofRecord};
pub use registry::{ProofFilter, ProofRegistry, Recorded, PROOFS_STREAM};
