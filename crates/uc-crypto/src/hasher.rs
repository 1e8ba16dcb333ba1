use uc_types::Digest;

use crate::canonical::{Canonical, EncodingError};

/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag (e.g. `"uc-proof-quality-v1"`) that is
/// prepended to every hash computation, so a quality commitment and a route
/// commitment over identical bytes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Commitments over QUALITY proof inputs.
    pub const QUALITY_COMMITMENT: Self = Self {
        domain: "uc-proof-quality-v1",
    };
    /// Commitments over ECONOMIC proof inputs.
    pub const ECONOMIC_COMMITMENT: Self = Self {
        domain: "uc-proof-economic-v1",
    };
    /// Commitments over ROUTE proof inputs.
    pub const ROUTE_COMMITMENT: Self = Self {
        domain: "uc-proof-route-v1",
    };
    /// Fingerprint of a complete proof record.
    pub const PROOF_RECORD: Self = Self {
        domain: "uc-proof-record-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Digest::from_bytes(*hasher.finalize().as_bytes())
    }

    /// Hash the canonical encoding of a value.
    pub fn hash_canonical<T: Canonical + ?Sized>(&self, value: &T) -> Result<Digest, EncodingError> {
        let bytes = value.canonical_bytes()?;
        Ok(self.hash(bytes.as_bytes()))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
