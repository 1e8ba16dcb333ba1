use tracing::debug;
use uc_crypto::ContentHasher;
use uc_types::{ActorRef, BatchId, Digest, ProofId, Timestamp};

use crate::claim::{Claim, Violation};
use crate::config::ProofConfig;
use crate::constraints::{economic, quality, route};
use crate::error::ProofError;
use crate::payload::{ProofPayload, ProofType};
use crate::record::ProofRecord;

/// Evaluates constraint families and produces proof records.
///
/// Stateless apart from its bounds, so one engine can serve any number of
/// threads.
#[derive(Clone, Debug, Default)]
pub struct ProofEngine {
    config: ProofConfig,
}

/// The full result of evaluating one payload.
///
/// Nothing has been persisted. The caller decides what to keep:
/// [`into_verified`](Self::into_verified) discards a failed evaluation,
/// [`into_record`](Self::into_record) keeps it as `verified: false`.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub proof_type: ProofType,
    pub subject: ActorRef,
    pub batch_id: Option<BatchId>,
    pub commitment: Digest,
    pub claim: Claim,
    pub violation: Option<Violation>,
}

impl Evaluation {
    pub fn is_verified(&self) -> bool {
        self.violation.is_none()
    }

    pub fn outcome(&self) -> Result<&Claim, &Violation> {
        match &self.violation {
            None => Ok(&self.claim),
            Some(violation) => Err(violation),
        }
    }

    /// A verified record, or [`ProofError::ConstraintViolation`].
    pub fn into_verified(self) -> Result<ProofRecord, ProofError> {
        match self.violation {
            Some(violation) => Err(ProofError::ConstraintViolation(violation)),
            None => Ok(self.into_record()),
        }
    }

    /// A record whose `verified` flag reflects the outcome.
    pub fn into_record(self) -> ProofRecord {
        ProofRecord {
            id: ProofId::new(),
            proof_type: self.proof_type,
            subject: self.subject,
            batch_id: self.batch_id,
            commitment: self.commitment,
            verified: self.violation.is_none(),
            claim: self.claim,
            created_at: Timestamp::now(),
        }
    }
}

impl ProofEngine {
    pub fn new(config: ProofConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProofConfig {
        &self.config
    }

    /// Commitment over a payload's canonical encoding, domain-separated by
    /// proof type.
    pub fn commitment(payload: &ProofPayload) -> Result<Digest, ProofError> {
        let hasher = match payload.proof_type() {
            ProofType::Quality => ContentHasher::QUALITY_COMMITMENT,
            ProofType::Economic => ContentHasher::ECONOMIC_COMMITMENT,
            ProofType::Route => ContentHasher::ROUTE_COMMITMENT,
        };
        Ok(hasher.hash_canonical(payload)?)
    }

    /// Run every sub-check of the payload's constraint family.
    ///
    /// Fails only for malformed or unencodable payloads; a failed constraint
    /// is reported through [`Evaluation::violation`].
    pub fn evaluate(
        &self,
        subject: &ActorRef,
        payload: &ProofPayload,
    ) -> Result<Evaluation, ProofError> {
        if subject.id.is_blank() {
            return Err(ProofError::invalid("subject", "actor id must not be empty"));
        }
        payload.validate()?;
        let commitment = Self::commitment(payload)?;

        let (claim, violation) = match payload {
            ProofPayload::Quality(p) => quality::evaluate(p, &self.config.quality),
            ProofPayload::Economic(p) => economic::evaluate(p, &self.config.economic),
            ProofPayload::Route(p) => route::evaluate(p, &self.config.route),
        };

        debug!(
            proof_type = %payload.proof_type(),
            subject = %subject,
            commitment = %commitment.short_hex(),
            verified = violation.is_none(),
            "constraints evaluated"
        );
        Ok(Evaluation {
            proof_type: payload.proof_type(),
            subject: subject.clone(),
            batch_id: payload.batch_id().cloned(),
            commitment,
            claim,
            violation,
        })
    }

    /// Evaluate and return a verified record, or the violated sub-check.
    pub fn generate(
        &self,
        subject: &ActorRef,
        payload: &ProofPayload,
    ) -> Result<ProofRecord, ProofError> {
        self.evaluate(subject, payload)?.into_verified()
    }
}
