use std::sync::Arc;

use tracing::{debug, info};
use uc_crypto::Canonical;
use uc_store::{InMemoryRecordStore, RecordStore, StoredRecord};
use uc_types::{ActorRef, Channel, Digest, RecordId};

use crate::chain::{ChainHead, HashChainBuilder};
use crate::error::LedgerError;
use crate::records::{
    ChannelPayload, EconomicRecord, EconomicTx, LedgerEntry, QualityRecord, QualityTx, Record,
};
use crate::traits::{LedgerReader, LedgerWriter};
use crate::validation;
use crate::verify::ChainReport;

/// The ledger store: two independent hash-chained channels over one
/// [`RecordStore`].
///
/// Each channel is persisted as its own stream (`economic`, `quality`).
/// Appends are serialized per channel by the [`HashChainBuilder`]; reads go
/// straight to the store and never take a chain lock.
pub struct Ledger<S> {
    store: Arc<S>,
    chain: HashChainBuilder,
}

impl Ledger<InMemoryRecordStore> {
    /// An empty ledger backed by memory.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryRecordStore::new()),
            chain: HashChainBuilder::new(),
        }
    }
}

impl<S: RecordStore> Ledger<S> {
    /// Open a ledger over existing storage, recovering both chain heads.
    ///
    /// Fails with [`LedgerError::IntegrityFailure`] if a stream's ids are not
    /// contiguous from 1 or a record is damaged or cannot be decoded. Hashes are not
    /// rechecked here; use [`verify_chain`](Self::verify_chain).
    pub fn open(store: Arc<S>) -> Result<Self, LedgerError> {
        let economic = recover_head::<EconomicTx, S>(&store)?;
        let quality = recover_head::<QualityTx, S>(&store)?;
        info!(
            economic = economic.len,
            quality = quality.len,
            "ledger opened"
        );
        Ok(Self {
            store,
            chain: HashChainBuilder::from_heads(economic, quality),
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Append on the Economic channel only if its tip is still `expected_tip`.
    pub fn append_economic_at(
        &self,
        expected_tip: Digest,
        submitted_by: ActorRef,
        tx: EconomicTx,
    ) -> Result<EconomicRecord, LedgerError> {
        self.append(Some(expected_tip), submitted_by, tx)
    }

    /// Append on the Quality channel only if its tip is still `expected_tip`.
    pub fn append_quality_at(
        &self,
        expected_tip: Digest,
        submitted_by: ActorRef,
        tx: QualityTx,
    ) -> Result<QualityRecord, LedgerError> {
        self.append(Some(expected_tip), submitted_by, tx)
    }

    fn append<P: ChannelPayload>(
        &self,
        expected_tip: Option<Digest>,
        submitted_by: ActorRef,
        payload: P,
    ) -> Result<Record<P>, LedgerError> {
        validation::validate_submitter(&submitted_by)?;
        payload.validate()?;

        let channel = P::CHANNEL;
        let record = self.chain.seal(
            channel,
            expected_tip,
            move |slot| {
                let record = Record {
                    id: slot.id,
                    timestamp: slot.timestamp,
                    submitted_by,
                    payload,
                    prev_hash: slot.prev_hash,
                    hash: Digest::GENESIS,
                };
                let bytes = record.canonical_bytes()?;
                Ok((record, bytes))
            },
            |record, hash| {
                record.hash = hash;
                let stored = StoredRecord::encode(record.id.seq(), &*record)?;
                self.store.append(channel.as_str(), &stored)?;
                Ok(())
            },
        )?;

        debug!(
            %channel,
            id = %record.label(),
            hash = %record.hash.short_hex(),
            "record sealed"
        );
        Ok(record)
    }

    fn records<P: ChannelPayload>(&self) -> Result<Vec<Record<P>>, LedgerError> {
        self.store
            .read_all(P::CHANNEL.as_str())?
            .iter()
            .map(|raw| raw.decode().map_err(LedgerError::from))
            .collect()
    }

    fn entries(&self, channel: Channel) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(match channel {
            Channel::Economic => self
                .records::<EconomicTx>()?
                .into_iter()
                .map(LedgerEntry::from)
                .collect(),
            Channel::Quality => self
                .records::<QualityTx>()?
                .into_iter()
                .map(LedgerEntry::from)
                .collect(),
        })
    }

    /// Look up one record by id.
    pub fn get(&self, channel: Channel, id: RecordId) -> Result<Option<LedgerEntry>, LedgerError> {
        let stream = channel.as_str();
        let Some(raw) = self
            .store
            .read_range(stream, id.seq(), id.seq())?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        Ok(Some(match channel {
            Channel::Economic => LedgerEntry::Economic(raw.decode()?),
            Channel::Quality => LedgerEntry::Quality(raw.decode()?),
        }))
    }

    /// The record sealed directly on top of `prev_hash`, if any.
    ///
    /// After an append whose outcome is unknown, a caller that read tip `t`
    /// checks `find_successor(channel, t)` before retrying, so the same
    /// payload is never sealed twice.
    pub fn find_successor(
        &self,
        channel: Channel,
        prev_hash: Digest,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self
            .entries(channel)?
            .into_iter()
            .find(|entry| entry.prev_hash() == prev_hash))
    }

    /// Recompute every hash and link of `channel` from persisted bytes.
    pub fn verify_chain(&self, channel: Channel) -> Result<ChainReport, LedgerError> {
        let scan = self.store.scan(channel.as_str())?;
        let damaged = scan.damaged.as_ref();
        let report = match channel {
            Channel::Economic => ChainReport::verify::<EconomicTx>(&scan.records, damaged),
            Channel::Quality => ChainReport::verify::<QualityTx>(&scan.records, damaged),
        };
        if report.is_valid() {
            debug!(%channel, records = report.record_count, "chain verified");
        }
        Ok(report)
    }
}

impl<S: RecordStore> LedgerWriter for Ledger<S> {
    fn append_economic(
        &self,
        submitted_by: ActorRef,
        tx: EconomicTx,
    ) -> Result<EconomicRecord, LedgerError> {
        self.append(None, submitted_by, tx)
    }

    fn append_quality(
        &self,
        submitted_by: ActorRef,
        tx: QualityTx,
    ) -> Result<QualityRecord, LedgerError> {
        self.append(None, submitted_by, tx)
    }
}

impl<S: RecordStore> LedgerReader for Ledger<S> {
    fn economic_records(&self) -> Result<Vec<EconomicRecord>, LedgerError> {
        self.records()
    }

    fn quality_records(&self) -> Result<Vec<QualityRecord>, LedgerError> {
        self.records()
    }

    fn head(&self, channel: Channel) -> Result<ChainHead, LedgerError> {
        self.chain.head(channel)
    }
}

fn recover_head<P: ChannelPayload, S: RecordStore>(store: &S) -> Result<ChainHead, LedgerError> {
    let channel = P::CHANNEL;
    let mut head = ChainHead::EMPTY;
    let scan = store.scan(channel.as_str())?;

    for (index, raw) in scan.records.iter().enumerate() {
        let seq = index as u64 + 1;
        let integrity = |reason: String| LedgerError::IntegrityFailure {
            channel,
            record_id: RecordId::new(seq),
            reason,
        };
        let record: Record<P> = raw.decode().map_err(|e| integrity(e.to_string()))?;
        if raw.seq != seq || record.id.seq() != seq {
            return Err(integrity(format!(
                "expected id {seq}, found {} stored at {}",
                record.id.seq(),
                raw.seq
            )));
        }
        head.tip = record.hash;
        head.len = seq;
        head.last_timestamp = head.last_timestamp.max(Some(record.timestamp));
    }
    if let Some(damaged) = scan.damaged {
        return Err(LedgerError::IntegrityFailure {
            channel,
            record_id: RecordId::new(damaged.seq),
            reason: damaged.reason,
        });
    }
    Ok(head)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use uc_store::{FileRecordStore, FileStoreConfig, StoreError, StoreResult};
    use uc_types::{ActorRole, Timestamp};

    use super::*;
    use crate::query::{EconomicFilter, QualityFilter};
    use crate::records::{EconomicEvent, PaymentMethod, QualityStage};
    use crate::verify::FailureKind;

    /// A store whose contents tests can rewrite and whose appends can be
    /// made to fail.
    #[derive(Default)]
    struct TestStore {
        streams: Mutex<HashMap<String, Vec<StoredRecord>>>,
        fail_appends: AtomicBool,
    }

    impl TestStore {
        fn rewrite<P: ChannelPayload>(&self, seq: u64, edit: impl FnOnce(&mut Record<P>)) {
            let mut streams = self.streams.lock().unwrap();
            let stored = &mut streams.get_mut(P::CHANNEL.as_str()).unwrap()[seq as usize - 1];
            let mut record: Record<P> = stored.decode().unwrap();
            edit(&mut record);
            *stored = StoredRecord::encode(seq, &record).unwrap();
        }

        fn push_raw(&self, stream: &str, record: StoredRecord) {
            let mut streams = self.streams.lock().unwrap();
            streams.entry(stream.to_string()).or_default().push(record);
        }
    }

    impl RecordStore for TestStore {
        fn append(&self, stream: &str, record: &StoredRecord) -> StoreResult<()> {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("injected failure")));
            }
            let mut streams = self.streams.lock().unwrap();
            let records = streams.entry(stream.to_string()).or_default();
            let expected = records.len() as u64 + 1;
            if record.seq != expected {
                return Err(StoreError::SequenceGap {
                    stream: stream.to_string(),
                    expected,
                    actual: record.seq,
                });
            }
            records.push(record.clone());
            Ok(())
        }

        fn read_all(&self, stream: &str) -> StoreResult<Vec<StoredRecord>> {
            let streams = self.streams.lock().unwrap();
            Ok(streams.get(stream).cloned().unwrap_or_default())
        }

        fn len(&self, stream: &str) -> StoreResult<u64> {
            let streams = self.streams.lock().unwrap();
            Ok(streams.get(stream).map_or(0, |r| r.len() as u64))
        }
    }

    fn farmer() -> ActorRef {
        ActorRef::new("did:farmer:ravi", ActorRole::Farmer)
    }

    fn register(batch: &str) -> EconomicTx {
        EconomicTx::new(
            ActorRole::Farmer,
            ActorRole::System,
            "Rice",
            0.0,
            PaymentMethod::Settlement,
            EconomicEvent::Register {
                variety: "Basmati".into(),
                farming_method: "Organic".into(),
            },
        )
        .with_batch(batch)
        .with_quantity(500.0, "kg")
    }

    fn sale(batch: &str, units: f64, price: f64) -> EconomicTx {
        EconomicTx::new(
            ActorRole::Retailer,
            ActorRole::Consumer,
            "Rice",
            units * price,
            PaymentMethod::Upi,
            EconomicEvent::Sale {
                units_sold: units,
                sale_price_per_unit: price,
            },
        )
        .with_batch(batch)
        .with_quantity(500.0, "kg")
    }

    fn inspection(batch: &str, stage: QualityStage) -> QualityTx {
        QualityTx::new(farmer(), stage, 92, 9.5, 6.0)
            .with_batch(batch)
            .with_evidence("ai-7f3a", "merkle-91bc")
    }

    #[test]
    fn first_record_links_to_genesis() {
        let ledger = Ledger::in_memory();
        let tx = EconomicTx::new(
            ActorRole::Farmer,
            ActorRole::System,
            "Rice",
            0.0,
            PaymentMethod::Settlement,
            EconomicEvent::Receive,
        );
        let record = ledger.append_economic(farmer(), tx).unwrap();

        assert_eq!(record.prev_hash, Digest::GENESIS);
        assert_ne!(record.hash, Digest::GENESIS);
        assert_eq!(record.id, RecordId::FIRST);
        assert_eq!(record.label(), "ECO-000001");
        assert_eq!(record.recompute_hash().unwrap(), record.hash);
    }

    #[test]
    fn second_record_links_to_first() {
        let ledger = Ledger::in_memory();
        let first = ledger.append_economic(farmer(), register("B1")).unwrap();
        let second = ledger
            .append_economic(ActorRef::new("did:retail:1", ActorRole::Retailer), sale("B1", 10.0, 40.0))
            .unwrap();

        assert_eq!(second.prev_hash, first.hash);
        assert_eq!(second.id, RecordId::new(2));
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(ledger.head(Channel::Economic).unwrap().tip, second.hash);
    }

    #[test]
    fn invalid_payload_never_reaches_the_chain() {
        let ledger = Ledger::in_memory();
        let mut tx = register("B1");
        tx.product = String::new();

        let err = ledger.append_economic(farmer(), tx).unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(ledger.head(Channel::Economic).unwrap(), ChainHead::EMPTY);

        let err = ledger
            .append_economic(ActorRef::new("", ActorRole::Farmer), register("B1"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { ref field, .. } if field == "submittedBy"));
    }

    #[test]
    fn concurrent_appends_keep_channels_independent() {
        let ledger = Ledger::in_memory();
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let ledger = &ledger;
                scope.spawn(move || {
                    for i in 0..25 {
                        ledger
                            .append_economic(farmer(), register(&format!("B{worker}-{i}")))
                            .unwrap();
                    }
                });
                scope.spawn(move || {
                    for i in 0..15 {
                        ledger
                            .append_quality(farmer(), inspection(&format!("B{worker}-{i}"), QualityStage::Harvest))
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(ledger.len(Channel::Economic).unwrap(), 100);
        assert_eq!(ledger.len(Channel::Quality).unwrap(), 60);
        for channel in Channel::ALL {
            let report = ledger.verify_chain(channel).unwrap();
            assert!(report.is_valid(), "{channel}: {report:?}");
        }

        let records = ledger.economic_records().unwrap();
        for pair in records.windows(2) {
            assert_eq!(pair[1].prev_hash, pair[0].hash);
            assert_eq!(pair[1].id, pair[0].id.next());
            assert!(pair[1].timestamp >= pair[0].timestamp);
        }
    }

    #[test]
    fn overwritten_amount_is_detected() {
        let ledger = Ledger::open(Arc::new(TestStore::default())).unwrap();
        ledger.append_economic(farmer(), register("B1")).unwrap();
        ledger.append_economic(farmer(), sale("B1", 10.0, 40.0)).unwrap();
        ledger.append_economic(farmer(), sale("B1", 5.0, 40.0)).unwrap();
        assert!(ledger.verify_chain(Channel::Economic).unwrap().is_valid());

        ledger
            .store()
            .rewrite::<EconomicTx>(2, |record| record.payload.amount = 4.0);

        let report = ledger.verify_chain(Channel::Economic).unwrap();
        assert!(!report.is_valid());
        let failure = report.first_failure.clone().unwrap();
        assert_eq!(failure.record_id, RecordId::new(2));
        assert_eq!(failure.label, "ECO-000002");
        assert_eq!(failure.kind, FailureKind::HashMismatch);
        assert!(matches!(
            report.into_result(),
            Err(LedgerError::IntegrityFailure { record_id, .. }) if record_id == RecordId::new(2)
        ));

        // The other channel is unaffected.
        assert!(ledger.verify_chain(Channel::Quality).unwrap().is_valid());
    }

    #[test]
    fn overwritten_amount_on_disk_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let open = || {
            let store = FileRecordStore::open(dir.path(), FileStoreConfig::default()).unwrap();
            Ledger::open(Arc::new(store))
        };
        let ledger = open().unwrap();
        ledger.append_economic(farmer(), register("B1")).unwrap();
        ledger.append_economic(farmer(), sale("B1", 3.0, 74.0)).unwrap();
        ledger.append_economic(farmer(), sale("B1", 1.0, 40.0)).unwrap();
        ledger
            .append_quality(farmer(), inspection("B1", QualityStage::Harvest))
            .unwrap();

        let path = ledger.store().segment_path("economic");
        let mut bytes = std::fs::read(&path).unwrap();
        let original = 222.0f64.to_le_bytes();
        let at = bytes.windows(8).position(|w| w == original).unwrap();
        bytes[at..at + 8].copy_from_slice(&999.0f64.to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        let report = ledger.verify_chain(Channel::Economic).unwrap();
        assert!(!report.is_valid());
        let failure = report.first_failure.unwrap();
        assert_eq!(failure.label, "ECO-000002");
        assert_eq!(failure.kind, FailureKind::Undecodable);
        assert!(ledger.verify_chain(Channel::Quality).unwrap().is_valid());

        drop(ledger);
        let err = open().err().unwrap();
        assert!(matches!(
            err,
            LedgerError::IntegrityFailure { channel: Channel::Economic, record_id, .. }
                if record_id == RecordId::new(2)
        ));
    }

    #[test]
    fn relinked_record_is_a_broken_link() {
        let ledger = Ledger::open(Arc::new(TestStore::default())).unwrap();
        ledger.append_quality(farmer(), inspection("B1", QualityStage::Harvest)).unwrap();
        ledger.append_quality(farmer(), inspection("B1", QualityStage::Sorting)).unwrap();

        ledger.store().rewrite::<QualityTx>(2, |record| {
            record.prev_hash = Digest::from_bytes([7; 32]);
            record.hash = record.recompute_hash().unwrap();
        });

        let report = ledger.verify_chain(Channel::Quality).unwrap();
        let failure = report.first_failure.unwrap();
        assert_eq!(failure.kind, FailureKind::BrokenLink);
        assert_eq!(failure.label, "QLT-000002");
    }

    #[test]
    fn timestamp_regression_is_detected() {
        let ledger = Ledger::open(Arc::new(TestStore::default())).unwrap();
        let first = ledger.append_economic(farmer(), register("B1")).unwrap();
        ledger.append_economic(farmer(), register("B2")).unwrap();

        let earlier = Timestamp::from_millis(first.timestamp.as_millis() - 1_000);
        ledger.store().rewrite::<EconomicTx>(2, |record| {
            record.timestamp = earlier;
            record.hash = record.recompute_hash().unwrap();
        });

        let report = ledger.verify_chain(Channel::Economic).unwrap();
        assert_eq!(
            report.first_failure.map(|f| f.kind),
            Some(FailureKind::TimestampRegression)
        );
    }

    #[test]
    fn failed_persist_does_not_advance_the_tip() {
        let store = Arc::new(TestStore::default());
        let ledger = Ledger::open(Arc::clone(&store)).unwrap();
        store.fail_appends.store(true, Ordering::SeqCst);

        let err = ledger.append_economic(farmer(), register("B1")).unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
        assert_eq!(ledger.head(Channel::Economic).unwrap(), ChainHead::EMPTY);

        store.fail_appends.store(false, Ordering::SeqCst);
        let record = ledger.append_economic(farmer(), register("B1")).unwrap();
        assert_eq!(record.id, RecordId::FIRST);
        assert_eq!(record.prev_hash, Digest::GENESIS);
    }

    #[test]
    fn compare_and_seal_detects_moved_tip() {
        let ledger = Ledger::in_memory();
        let first = ledger
            .append_economic_at(Digest::GENESIS, farmer(), register("B1"))
            .unwrap();

        let err = ledger
            .append_economic_at(Digest::GENESIS, farmer(), register("B1"))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ChainConflict { actual, .. } if actual == first.hash
        ));

        // A retry first asks whether its tip already has a successor.
        let successor = ledger
            .find_successor(Channel::Economic, Digest::GENESIS)
            .unwrap()
            .unwrap();
        assert_eq!(successor.hash(), first.hash);
        assert!(ledger
            .find_successor(Channel::Economic, first.hash)
            .unwrap()
            .is_none());

        let second = ledger
            .append_economic_at(first.hash, farmer(), register("B2"))
            .unwrap();
        assert_eq!(second.prev_hash, first.hash);
    }

    #[test]
    fn queries_filter_in_append_order() {
        let ledger = Ledger::in_memory();
        ledger.append_economic(farmer(), register("B1")).unwrap();
        ledger.append_economic(farmer(), register("B2")).unwrap();
        ledger.append_economic(farmer(), sale("B1", 2.0, 50.0)).unwrap();
        ledger.append_quality(farmer(), inspection("B1", QualityStage::Harvest)).unwrap();
        ledger.append_quality(farmer(), inspection("B2", QualityStage::Retail)).unwrap();

        let b1 = ledger.query_economic(&EconomicFilter::new().batch("B1")).unwrap();
        let ids: Vec<u64> = b1.iter().map(|r| r.id.seq()).collect();
        assert_eq!(ids, vec![1, 3]);

        let sales = ledger
            .query_economic(&EconomicFilter::new().from_party(ActorRole::Retailer))
            .unwrap();
        assert_eq!(sales.len(), 1);
        assert!(ledger
            .query_economic(&EconomicFilter::new().batch("B2").to_party(ActorRole::Consumer))
            .unwrap()
            .is_empty());

        assert_eq!(ledger.query_economic(&EconomicFilter::new()).unwrap().len(), 3);
        let retail = ledger
            .query_quality(&QualityFilter::new().stage(QualityStage::Retail))
            .unwrap();
        assert_eq!(retail.len(), 1);
        assert_eq!(retail[0].batch_id().map(|b| b.as_str()), Some("B2"));
    }

    #[test]
    fn get_by_id() {
        let ledger = Ledger::in_memory();
        let record = ledger.append_quality(farmer(), inspection("B1", QualityStage::Harvest)).unwrap();

        let entry = ledger.get(Channel::Quality, RecordId::FIRST).unwrap().unwrap();
        assert_eq!(entry, LedgerEntry::Quality(record));
        assert!(ledger.get(Channel::Quality, RecordId::new(2)).unwrap().is_none());
        assert!(ledger.get(Channel::Economic, RecordId::FIRST).unwrap().is_none());
    }

    #[test]
    fn reopen_recovers_heads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (second, quality) = {
            let store = FileRecordStore::open(dir.path(), FileStoreConfig::default()).unwrap();
            let ledger = Ledger::open(Arc::new(store)).unwrap();
            ledger.append_economic(farmer(), register("B1")).unwrap();
            let second = ledger.append_economic(farmer(), sale("B1", 1.0, 60.0)).unwrap();
            let quality = ledger
                .append_quality(farmer(), inspection("B1", QualityStage::Harvest))
                .unwrap();
            (second, quality)
        };

        let store = FileRecordStore::open(dir.path(), FileStoreConfig::default()).unwrap();
        let ledger = Ledger::open(Arc::new(store)).unwrap();
        let head = ledger.head(Channel::Economic).unwrap();
        assert_eq!(head.len, 2);
        assert_eq!(head.tip, second.hash);
        assert_eq!(ledger.head(Channel::Quality).unwrap().tip, quality.hash);

        let third = ledger.append_economic(farmer(), register("B2")).unwrap();
        assert_eq!(third.prev_hash, second.hash);
        assert_eq!(third.id, RecordId::new(3));
        assert!(third.timestamp >= second.timestamp);
        assert!(ledger.verify_chain(Channel::Economic).unwrap().is_valid());
    }

    #[test]
    fn open_refuses_non_contiguous_ids() {
        let store = TestStore::default();
        let record = Record {
            id: RecordId::new(5),
            timestamp: Timestamp::from_millis(1),
            submitted_by: farmer(),
            payload: register("B1"),
            prev_hash: Digest::GENESIS,
            hash: Digest::GENESIS,
        };
        store.push_raw("economic", StoredRecord::encode(1, &record).unwrap());

        let err = Ledger::open(Arc::new(store)).err().unwrap();
        assert!(matches!(
            err,
            LedgerError::IntegrityFailure { channel: Channel::Economic, .. }
        ));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(16))]

        #[test]
        fn every_sequence_of_appends_forms_a_valid_chain(
            prices in proptest::collection::vec(0.0f64..1_000.0, 1..12)
        ) {
            let ledger = Ledger::in_memory();
            for price in &prices {
                ledger.append_economic(farmer(), sale("P", 1.0, *price)).unwrap();
            }
            let records = ledger.economic_records().unwrap();
            proptest::prop_assert_eq!(records.len(), prices.len());
            proptest::prop_assert_eq!(records[0].prev_hash, Digest::GENESIS);
            for pair in records.windows(2) {
                proptest::prop_assert_eq!(pair[1].prev_hash, pair[0].hash);
            }
            for record in &records {
                proptest::prop_assert_eq!(record.recompute_hash().unwrap(), record.hash);
            }
            proptest::prop_assert!(ledger.verify_chain(Channel::Economic).unwrap().is_valid());
        }
    }
}
