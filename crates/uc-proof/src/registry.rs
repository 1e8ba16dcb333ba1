use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};
use uc_store::{InMemoryRecordStore, RecordStore, StoredRecord};
use uc_types::{ActorId, BatchId, ProofId};

use crate::engine::ProofEngine;
use crate::error::ProofError;
use crate::payload::{ProofPayload, ProofType};
use crate::record::{ProofKey, ProofRecord};

/// Stream holding every recorded proof, in insertion order.
pub const PROOFS_STREAM: &str = "proofs";

/// Outcome of [`ProofRegistry::record_proof`].
#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Inserted(ProofRecord),
    /// A proof with the same key was already stored; this is it.
    Duplicate(ProofRecord),
}

impl Recorded {
    pub fn record(&self) -> &ProofRecord {
        match self {
            Self::Inserted(r) | Self::Duplicate(r) => r,
        }
    }

    pub fn into_record(self) -> ProofRecord {
        match self {
            Self::Inserted(r) | Self::Duplicate(r) => r,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Criteria for [`ProofRegistry::query`]. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProofFilter {
    pub batch_id: Option<BatchId>,
    pub proof_type: Option<ProofType>,
    pub verified: Option<bool>,
    pub subject_id: Option<ActorId>,
}

impl ProofFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(mut self, batch_id: impl Into<BatchId>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn proof_type(mut self, proof_type: ProofType) -> Self {
        self.proof_type = Some(proof_type);
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn subject(mut self, subject_id: impl Into<ActorId>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn matches(&self, record: &ProofRecord) -> bool {
        self.batch_id
            .as_ref()
            .map_or(true, |b| record.batch_id.as_ref() == Some(b))
            && self.proof_type.map_or(true, |t| record.proof_type == t)
            && self.verified.map_or(true, |v| record.verified == v)
            && self
                .subject_id
                .as_ref()
                .map_or(true, |s| &record.subject.id == s)
    }
}

#[derive(Default)]
struct RegistryState {
    records: Vec<ProofRecord>,
    by_key: HashMap<ProofKey, usize>,
    by_id: HashMap<ProofId, usize>,
}

impl RegistryState {
    fn index(&mut self, record: ProofRecord) -> usize {
        let position = self.records.len();
        self.by_key.insert(record.key(), position);
        self.by_id.insert(record.id, position);
        self.records.push(record);
        position
    }
}

/// Persists proofs exactly once and answers lookups and audits.
///
/// Records live in the [`PROOFS_STREAM`] of a [`RecordStore`]; an in-memory
/// index over them is rebuilt by [`open`](Self::open). Inserts take the
/// write lock for the whole check-persist-index sequence, so two racing
/// submissions of the same proof yield one record.
pub struct ProofRegistry<S> {
    store: Arc<S>,
    engine: ProofEngine,
    state: RwLock<RegistryState>,
}

impl ProofRegistry<InMemoryRecordStore> {
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryRecordStore::new()),
            engine: ProofEngine::default(),
            state: RwLock::new(RegistryState::default()),
        }
    }
}

impl<S: RecordStore> ProofRegistry<S> {
    /// Open a registry over existing storage, rebuilding its index.
    pub fn open(store: Arc<S>, engine: ProofEngine) -> Result<Self, ProofError> {
        let mut state = RegistryState::default();
        let scan = store.scan(PROOFS_STREAM)?;
        if let Some(damaged) = scan.damaged {
            return Err(ProofError::CorruptStream {
                seq: damaged.seq,
                reason: damaged.reason,
            });
        }
        for (position, raw) in scan.records.iter().enumerate() {
            let expected = position as u64 + 1;
            if raw.seq != expected {
                return Err(ProofError::CorruptStream {
                    seq: raw.seq,
                    reason: format!("expected position {expected}"),
                });
            }
            let record: ProofRecord = raw.decode().map_err(|e| ProofError::CorruptStream {
                seq: raw.seq,
                reason: e.to_string(),
            })?;
            if state.by_key.contains_key(&record.key()) {
                return Err(ProofError::CorruptStream {
                    seq: raw.seq,
                    reason: format!("proof {} duplicates an earlier record", record.id),
                });
            }
            state.index(record);
        }
        info!(proofs = state.records.len(), "proof registry opened");
        Ok(Self {
            store,
            engine,
            state: RwLock::new(state),
        })
    }

    pub fn engine(&self) -> &ProofEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Persist `record` unless a proof with the same key already exists.
    pub fn record_proof(&self, record: ProofRecord) -> Result<Recorded, ProofError> {
        let mut state = self.state.write().map_err(|_| ProofError::LockPoisoned)?;
        if let Some(&position) = state.by_key.get(&record.key()) {
            let existing = state.records[position].clone();
            debug!(id = %existing.id, "proof already recorded");
            return Ok(Recorded::Duplicate(existing));
        }

        let seq = state.records.len() as u64 + 1;
        let stored = StoredRecord::encode(seq, &record)?;
        self.store.append(PROOFS_STREAM, &stored)?;
        state.index(record.clone());

        info!(
            id = %record.id,
            proof_type = %record.proof_type,
            subject = %record.subject,
            verified = record.verified,
            "proof recorded"
        );
        Ok(Recorded::Inserted(record))
    }

    pub fn get(&self, id: ProofId) -> Result<Option<ProofRecord>, ProofError> {
        let state = self.state.read().map_err(|_| ProofError::LockPoisoned)?;
        Ok(state.by_id.get(&id).map(|&p| state.records[p].clone()))
    }

    /// Matching proofs, newest first.
    pub fn query(&self, filter: &ProofFilter) -> Result<Vec<ProofRecord>, ProofError> {
        let state = self.state.read().map_err(|_| ProofError::LockPoisoned)?;
        let mut hits: Vec<(usize, &ProofRecord)> = state
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r))
            .collect();
        hits.sort_by_key(|(position, r)| Reverse((r.created_at, *position)));
        Ok(hits.into_iter().map(|(_, r)| r.clone()).collect())
    }

    pub fn len(&self) -> Result<usize, ProofError> {
        let state = self.state.read().map_err(|_| ProofError::LockPoisoned)?;
        Ok(state.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, ProofError> {
        Ok(self.len()? == 0)
    }

    /// Re-run the constraint family against a freshly supplied payload.
    ///
    /// `true` only when the payload commits to `record.commitment`, belongs
    /// to the same batch, and reproduces `record.verified`. A malformed
    /// payload is a `false`, not an error.
    pub fn recompute(&self, record: &ProofRecord, payload: &ProofPayload) -> Result<bool, ProofError> {
        if payload.proof_type() != record.proof_type {
            warn!(id = %record.id, supplied = %payload.proof_type(), "proof type mismatch");
            return Ok(false);
        }
        let evaluation = match self.engine.evaluate(&record.subject, payload) {
            Ok(evaluation) => evaluation,
            Err(ProofError::InvalidPayload { .. } | ProofError::Encoding(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let matches = evaluation.commitment == record.commitment
            && evaluation.batch_id == record.batch_id
            && evaluation.is_verified() == record.verified;
        if !matches {
            warn!(id = %record.id, "recomputed proof does not match record");
        }
        Ok(matches)
    }

    /// [`recompute`](Self::recompute) for a stored proof; `None` if unknown.
    pub fn recompute_by_id(
        &self,
        id: ProofId,
        payload: &ProofPayload,
    ) -> Result<Option<bool>, ProofError> {
        match self.get(id)? {
            Some(record) => self.recompute(&record, payload).map(Some),
            None => Ok(None),
        }
    }
}
