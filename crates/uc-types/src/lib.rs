//! Foundation types for UNI-CHAIN.
//!
//! This crate provides the identity, temporal, and structural types shared by
//! the ledger and the proof engine. Every other UNI-CHAIN crate depends on
//! `uc-types`.
//!
//! # Key Types
//!
//! - [`Digest`] -- 256-bit hash rendered as lowercase hex, with the all-zero
//!   [`Digest::GENESIS`] sentinel
//! - [`Timestamp`] -- millisecond wall-clock instant rendered as RFC 3339
//! - [`ActorRef`] / [`ActorRole`] -- the identity tag attached to every append
//! - [`Channel`] -- the two independent ledger channels
//! - [`RecordId`], [`BatchId`], [`ProofId`] -- identifiers

pub mod actor;
pub mod channel;
pub mod digest;
pub mod error;
pub mod ids;
pub mod temporal;

pub use actor::{ActorId, ActorRef, ActorRole};
pub use channel::Channel;
pub use digest::Digest;
pub use error::TypeError;
pub use ids::{BatchId, ProofId, RecordId};
pub use temporal::Timestamp;
