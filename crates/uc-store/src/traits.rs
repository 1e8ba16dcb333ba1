use crate::error::StoreResult;
use crate::record::{StoredRecord, StreamScan};

/// Append-only, sequence-keyed record store.
///
/// All implementations must satisfy these invariants:
/// - `append` succeeds only when `record.seq == len(stream) + 1`.
/// - A failed `append` leaves the stream unchanged; a successful one is
///   visible to every subsequent read.
/// - Reads never observe a partially written record.
/// - Records come back in strict sequence order.
/// - Appends to different streams may proceed in parallel.
pub trait RecordStore: Send + Sync {
    /// Append the next record to `stream`.
    fn append(&self, stream: &str, record: &StoredRecord) -> StoreResult<()>;

    /// Read every record of `stream` in sequence order.
    ///
    /// Returns an empty vector for streams that were never written.
    fn read_all(&self, stream: &str) -> StoreResult<Vec<StoredRecord>>;

    /// Read `stream` up to the first damaged record, reporting where the
    /// damage starts instead of failing.
    ///
    /// Backends without persisted frames never report damage.
    fn scan(&self, stream: &str) -> StoreResult<StreamScan> {
        Ok(StreamScan::intact(self.read_all(stream)?))
    }

    /// Number of records in `stream`.
    fn len(&self, stream: &str) -> StoreResult<u64>;

    /// The most recently appended record, if any.
    ///
    /// Default implementation reads the whole stream. Backends may override.
    fn last(&self, stream: &str) -> StoreResult<Option<StoredRecord>> {
        Ok(self.read_all(stream)?.pop())
    }

    /// Read records with `from_seq <= seq <= to_seq`.
    ///
    /// Default implementation filters `read_all`.
    fn read_range(&self, stream: &str, from_seq: u64, to_seq: u64) -> StoreResult<Vec<StoredRecord>> {
        Ok(self
            .read_all(stream)?
            .into_iter()
            .filter(|r| r.seq >= from_seq && r.seq <= to_seq)
            .collect())
    }

    /// Returns `true` when `stream` holds no records.
    fn is_empty(&self, stream: &str) -> StoreResult<bool> {
        Ok(self.len(stream)? == 0)
    }
}
