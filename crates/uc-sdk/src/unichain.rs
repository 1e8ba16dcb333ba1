use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uc_ledger::{
    BatchTrail, ChainHead, ChainReport, EconomicFilter, EconomicRecord, EconomicTx, Ledger,
    LedgerReader, LedgerWriter, QualityFilter, QualityRecord, QualityTx,
};
use uc_proof::{
    Evaluation, ProofConfig, ProofEngine, ProofFilter, ProofPayload, ProofRecord, ProofRegistry,
    Recorded,
};
use uc_store::{FileRecordStore, FileStoreConfig, InMemoryRecordStore, RecordStore};
use uc_types::{ActorRef, BatchId, Channel, ProofId};

use crate::error::{SdkError, SdkResult};

/// Settings for [`Unichain::open_dir`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnichainConfig {
    pub store: FileStoreConfig,
    pub proofs: ProofConfig,
}

/// High-level UNI-CHAIN API.
///
/// Bundles the two ledger channels and the proof registry over one record
/// store. Every method is safe to call from many threads at once.
pub struct Unichain<S> {
    ledger: Ledger<S>,
    proofs: ProofRegistry<S>,
}

impl Unichain<InMemoryRecordStore> {
    /// An empty instance backed by memory, with default proof bounds.
    pub fn in_memory() -> SdkResult<Self> {
        Self::open(Arc::new(InMemoryRecordStore::new()), ProofConfig::default())
    }
}

impl Unichain<FileRecordStore> {
    /// Open (or create) the segment files under `dir`.
    pub fn open_dir(dir: &Path, config: &UnichainConfig) -> SdkResult<Self> {
        let store = Arc::new(FileRecordStore::open(dir, config.store.clone())?);
        let unichain = Self::open(store, config.proofs.clone())?;
        info!(dir = %dir.display(), "unichain opened");
        Ok(unichain)
    }
}

impl<S: RecordStore> Unichain<S> {
    /// Recover both chain heads and the proof index from `store`.
    pub fn open(store: Arc<S>, proofs: ProofConfig) -> SdkResult<Self> {
        let ledger = Ledger::open(Arc::clone(&store))?;
        let proofs = ProofRegistry::open(store, ProofEngine::new(proofs))?;
        Ok(Self { ledger, proofs })
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn proofs(&self) -> &ProofRegistry<S> {
        &self.proofs
    }

    // ---- Ledger operations ----

    pub fn append_economic(
        &self,
        submitted_by: ActorRef,
        tx: EconomicTx,
    ) -> SdkResult<EconomicRecord> {
        Ok(self.ledger.append_economic(submitted_by, tx)?)
    }

    pub fn append_quality(&self, submitted_by: ActorRef, tx: QualityTx) -> SdkResult<QualityRecord> {
        Ok(self.ledger.append_quality(submitted_by, tx)?)
    }

    pub fn query_economic(&self, filter: &EconomicFilter) -> SdkResult<Vec<EconomicRecord>> {
        Ok(self.ledger.query_economic(filter)?)
    }

    pub fn query_quality(&self, filter: &QualityFilter) -> SdkResult<Vec<QualityRecord>> {
        Ok(self.ledger.query_quality(filter)?)
    }

    pub fn head(&self, channel: Channel) -> SdkResult<ChainHead> {
        Ok(self.ledger.head(channel)?)
    }

    pub fn verify_chain(&self, channel: Channel) -> SdkResult<ChainReport> {
        Ok(self.ledger.verify_chain(channel)?)
    }

    /// One report per channel, Economic first.
    pub fn verify_all(&self) -> SdkResult<Vec<ChainReport>> {
        Channel::ALL
            .into_iter()
            .map(|channel| self.verify_chain(channel))
            .collect()
    }

    pub fn batch_trail(&self, batch_id: &BatchId) -> SdkResult<BatchTrail> {
        Ok(BatchTrail::build(&self.ledger, batch_id)?)
    }

    // ---- Proof operations ----

    /// Evaluate without deciding whether to keep the result.
    pub fn evaluate_proof(&self, subject: &ActorRef, payload: &ProofPayload) -> SdkResult<Evaluation> {
        Ok(self.proofs.engine().evaluate(subject, payload)?)
    }

    /// A verified proof record, not yet stored.
    pub fn generate_proof(&self, subject: &ActorRef, payload: &ProofPayload) -> SdkResult<ProofRecord> {
        Ok(self.proofs.engine().generate(subject, payload)?)
    }

    /// Generate and record in one step. A constraint failure is returned as
    /// an error and nothing is stored.
    pub fn attest(&self, subject: &ActorRef, payload: &ProofPayload) -> SdkResult<Recorded> {
        let record = self.generate_proof(subject, payload)?;
        self.record_proof(record)
    }

    pub fn record_proof(&self, record: ProofRecord) -> SdkResult<Recorded> {
        Ok(self.proofs.record_proof(record)?)
    }

    /// Matching proofs, newest first.
    pub fn query_proofs(&self, filter: &ProofFilter) -> SdkResult<Vec<ProofRecord>> {
        Ok(self.proofs.query(filter)?)
    }

    pub fn get_proof(&self, id: ProofId) -> SdkResult<Option<ProofRecord>> {
        Ok(self.proofs.get(id)?)
    }

    /// Audit a stored proof against freshly supplied inputs.
    pub fn recompute_proof(&self, id: ProofId, payload: &ProofPayload) -> SdkResult<bool> {
        self.proofs
            .recompute_by_id(id, payload)?
            .ok_or_else(|| SdkError::ProofNotFound(id.to_string()))
    }
}
