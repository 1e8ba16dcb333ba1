use serde::{Deserialize, Serialize};
use uc_crypto::{Canonical, CanonicalPayload, ContentHasher, EncodingError};
use uc_types::{ActorId, ActorRef, BatchId, Digest, ProofId, Timestamp};

use crate::claim::Claim;
use crate::payload::ProofType;

/// An immutable attestation produced by the proof engine.
///
/// `verified` is fixed at creation; records are never revised.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub id: ProofId,
    pub proof_type: ProofType,
    /// The attesting actor.
    pub subject: ActorRef,
    pub batch_id: Option<BatchId>,
    /// Domain-separated BLAKE3 over the canonical private inputs.
    pub commitment: Digest,
    pub claim: Claim,
    pub verified: bool,
    pub created_at: Timestamp,
}

/// The identity under which a proof is stored exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProofKey {
    pub proof_type: ProofType,
    pub subject_id: ActorId,
    pub batch_id: Option<BatchId>,
    pub commitment: Digest,
}

impl ProofRecord {
    pub fn key(&self) -> ProofKey {
        ProofKey {
            proof_type: self.proof_type,
            subject_id: self.subject.id.clone(),
            batch_id: self.batch_id.clone(),
            commitment: self.commitment,
        }
    }

    /// Fingerprint of the whole record, shown alongside the claim.
    pub fn proof_hash(&self) -> Result<Digest, EncodingError> {
        ContentHasher::PROOF_RECORD.hash_canonical(self)
    }
}

impl Canonical for ProofRecord {
    fn canonical_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        let mut out = CanonicalPayload::new();
        out.insert("id", self.id.to_string())?
            .insert("proofType", self.proof_type.as_str())?
            .insert("subject.id", self.subject.id.as_str())?
            .insert("subject.role", self.subject.role.as_str())?
            .insert_opt("batchId", self.batch_id.as_ref().map(BatchId::as_str))?
            .insert("commitment", self.commitment.to_hex())?
            .insert("verified", self.verified)?
            .insert("createdAt", self.created_at.as_millis())?;
        self.claim.write_fields(&mut out)?;
        Ok(out)
    }
}
