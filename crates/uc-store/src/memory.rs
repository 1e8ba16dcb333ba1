use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{validate_stream, StoreError, StoreResult};
use crate::record::StoredRecord;
use crate::traits::RecordStore;

/// In-memory, HashMap-based record store.
///
/// Intended for tests and embedding. Streams live behind one `RwLock`, so
/// reads run concurrently and an append is visible all at once or not at all.
pub struct InMemoryRecordStore {
    streams: RwLock<HashMap<String, Vec<StoredRecord>>>,
}

impl InMemoryRecordStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
        }
    }

    /// Names of all streams that hold at least one record, sorted.
    pub fn stream_names(&self) -> StoreResult<Vec<String>> {
        let map = self.streams.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Total bytes across all stored records.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        let map = self.streams.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map
            .values()
            .flat_map(|records| records.iter())
            .map(|r| r.size() as u64)
            .sum())
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append(&self, stream: &str, record: &StoredRecord) -> StoreResult<()> {
        validate_stream(stream)?;
        let mut map = self.streams.write().map_err(|_| StoreError::LockPoisoned)?;
        let records = map.entry(stream.to_string()).or_default();
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
        validate_stream(stream)?;
        let map = self.streams.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(stream).cloned().unwrap_or_default())
    }

    fn len(&self, stream: &str) -> StoreResult<u64> {
        validate_stream(stream)?;
        let map = self.streams.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(stream).map_or(0, |r| r.len() as u64))
    }

    fn last(&self, stream: &str) -> StoreResult<Option<StoredRecord>> {
        validate_stream(stream)?;
        let map = self.streams.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(stream).and_then(|r| r.last().cloned()))
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let streams = self.stream_names().unwrap_or_default();
        f.debug_struct("InMemoryRecordStore")
            .field("streams", &streams)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seq: u64, body: &str) -> StoredRecord {
        StoredRecord::new(seq, body.as_bytes().to_vec())
    }

    #[test]
    fn append_and_read_in_order() {
        let store = InMemoryRecordStore::new();
        store.append("economic", &record(1, "a")).unwrap();
        store.append("economic", &record(2, "b")).unwrap();

        let all = store.read_all("economic").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].data, b"a");
        assert_eq!(all[1].seq, 2);
        assert_eq!(store.last("economic").unwrap().unwrap().data, b"b");
    }

    #[test]
    fn append_rejects_sequence_gap() {
        let store = InMemoryRecordStore::new();
        let err = store.append("quality", &record(2, "x")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::SequenceGap { expected: 1, actual: 2, .. }
        ));
        assert!(store.is_empty("quality").unwrap());
    }

    #[test]
    fn streams_are_independent() {
        let store = InMemoryRecordStore::new();
        store.append("economic", &record(1, "e")).unwrap();
        store.append("quality", &record(1, "q")).unwrap();
        store.append("quality", &record(2, "q")).unwrap();

        assert_eq!(store.len("economic").unwrap(), 1);
        assert_eq!(store.len("quality").unwrap(), 2);
        assert_eq!(store.stream_names().unwrap(), vec!["economic", "quality"]);
        assert_eq!(store.total_bytes().unwrap(), 3);
    }

    #[test]
    fn unknown_stream_reads_empty() {
        let store = InMemoryRecordStore::new();
        assert!(store.read_all("proofs").unwrap().is_empty());
        assert!(store.last("proofs").unwrap().is_none());
        assert_eq!(store.len("proofs").unwrap(), 0);
    }

    #[test]
    fn read_range_is_inclusive() {
        let store = InMemoryRecordStore::new();
        for seq in 1..=5 {
            store.append("economic", &record(seq, "r")).unwrap();
        }
        let range = store.read_range("economic", 2, 4).unwrap();
        let seqs: Vec<u64> = range.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![2, 3, 4]);
    }

    #[test]
    fn invalid_stream_names_rejected() {
        let store = InMemoryRecordStore::new();
        assert!(matches!(
            store.append("../etc", &record(1, "x")),
            Err(StoreError::InvalidStream(_))
        ));
        assert!(store.read_all("").is_err());
    }
}
