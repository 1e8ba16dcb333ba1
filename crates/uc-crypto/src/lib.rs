//! Cryptographic primitives for UNI-CHAIN.
//!
//! Provides the canonical payload encoder, domain-separated BLAKE3 hashing,
//! and hash-chain computation/verification.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod canonical;
pub mod chain;
pub mod hasher;

pub use canonical::{Canonical, CanonicalBytes, CanonicalPayload, EncodingError, FieldValue};
pub use chain::{ChainError, ChainLink, HashChainVerifier};
pub use hasher::ContentHasher;
