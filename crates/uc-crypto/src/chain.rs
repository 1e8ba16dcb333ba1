use uc_types::Digest;

use crate::canonical::{CanonicalBytes, EncodingError};

/// A record that participates in a hash chain.
pub trait ChainLink {
    /// Sequence number of the record within its chain (1-based).
    fn link_seq(&self) -> u64;
    /// The record's own stored hash.
    fn link_hash(&self) -> Digest;
    /// The stored hash of the preceding record ([`Digest::GENESIS`] for the first).
    fn link_prev_hash(&self) -> Digest;
    /// Canonical bytes of every hashed field (everything except the two hashes).
    fn link_payload(&self) -> Result<CanonicalBytes, EncodingError>;
}

/// Hash-chain computation and verification.
///
/// `hash = BLAKE3(canonical_bytes || prev_hash)`, where `prev_hash` is the
/// raw 32-byte digest of the preceding record, or [`Digest::GENESIS`] for
/// the first record.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Compute the chained hash for a payload and its predecessor.
    pub fn compute_hash(payload: &[u8], prev_hash: &Digest) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(payload);
        hasher.update(prev_hash.as_bytes());
        Digest::from_bytes(*hasher.finalize().as_bytes())
    }

    /// Verify a chain of records in append order.
    ///
    /// Checks, stopping at the first failure:
    /// 1. The first record links to the genesis digest
    /// 2. Each subsequent record's prev hash is the previous record's hash
    /// 3. Each record's hash is correct for its payload and prev hash
    pub fn verify_chain<L: ChainLink>(links: &[L]) -> Result<(), ChainError> {
        let mut expected_prev = Digest::GENESIS;
        for link in links {
            Self::verify_link(link, &expected_prev)?;
            expected_prev = link.link_hash();
        }
        Ok(())
    }

    /// Verify one record against the hash it must link to.
    pub fn verify_link<L: ChainLink>(link: &L, expected_prev: &Digest) -> Result<(), ChainError> {
        let seq = link.link_seq();
        if link.link_prev_hash() != *expected_prev {
            return Err(if expected_prev.is_genesis() {
                ChainError::GenesisMismatch { seq }
            } else {
                ChainError::BrokenLink { seq }
            });
        }

        let payload = link.link_payload().map_err(|e| ChainError::Unencodable {
            seq,
            reason: e.to_string(),
        })?;
        if Self::compute_hash(payload.as_bytes(), expected_prev) != link.link_hash() {
            return Err(ChainError::HashMismatch { seq });
        }
        Ok(())
    }
}

/// Errors from chain verification, each naming the first offending record.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("record {seq}: first record does not link to the genesis digest")]
    GenesisMismatch { seq: u64 },

    #[error("record {seq}: prev hash does not match the preceding record")]
    BrokenLink { seq: u64 },

    #[error("record {seq}: stored hash differs from the recomputed hash")]
    HashMismatch { seq: u64 },

    #[error("record {seq}: payload cannot be encoded: {reason}")]
    Unencodable { seq: u64, reason: String },
}

impl ChainError {
    /// Sequence number of the offending record.
    pub fn seq(&self) -> u64 {
        match self {
            Self::GenesisMismatch { seq }
            | Self::BrokenLink { seq }
            | Self::HashMismatch { seq }
            | Self::Unencodable { seq, .. } => *seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalPayload;

    struct TestRecord {
        seq: u64,
        hash: Digest,
        prev: Digest,
        amount: f64,
    }

    impl ChainLink for TestRecord {
        fn link_seq(&self) -> u64 {
            self.seq
        }
        fn link_hash(&self) -> Digest {
            self.hash
        }
        fn link_prev_hash(&self) -> Digest {
            self.prev
        }
        fn link_payload(&self) -> Result<CanonicalBytes, EncodingError> {
            CanonicalPayload::new()
                .with("id", self.seq)?
                .with("amount", self.amount)?
                .encode()
        }
    }

    fn build_chain(count: u64) -> Vec<TestRecord> {
        let mut chain = Vec::new();
        let mut prev = Digest::GENESIS;
        for seq in 1..=count {
            let mut record = TestRecord {
                seq,
                hash: Digest::GENESIS,
                prev,
                amount: seq as f64 * 10.0,
            };
            let payload = record.link_payload().unwrap();
            record.hash = HashChainVerifier::compute_hash(payload.as_bytes(), &prev);
            prev = record.hash;
            chain.push(record);
        }
        chain
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestRecord> = vec![];
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn multi_record_chain() {
        let chain = build_chain(10);
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
        assert_eq!(chain[1].prev, chain[0].hash);
    }

    #[test]
    fn hash_covers_prev_hash() {
        let a = HashChainVerifier::compute_hash(b"{}", &Digest::GENESIS);
        let b = HashChainVerifier::compute_hash(b"{}", &Digest::from_bytes([1; 32]));
        assert_ne!(a, b);
    }

    #[test]
    fn first_record_must_link_to_genesis() {
        let mut chain = build_chain(2);
        chain[0].prev = Digest::from_bytes([9; 32]);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::GenesisMismatch { seq: 1 });
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = Digest::from_bytes([99; 32]);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::BrokenLink { seq: 3 });
    }

    #[test]
    fn tampered_field_detected_at_that_record() {
        let mut chain = build_chain(4);
        chain[1].amount = 1_000_000.0;
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { seq: 2 });
        assert_eq!(err.seq(), 2);
    }

    #[test]
    fn unencodable_payload_reported() {
        let mut chain = build_chain(2);
        chain[1].amount = f64::NAN;
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert!(matches!(err, ChainError::Unencodable { seq: 2, .. }));
    }
}
