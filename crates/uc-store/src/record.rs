use serde::{Deserialize, Serialize};

/// The unit of storage: a sequence number plus opaque serialized bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// 1-based position in the stream.
    pub seq: u64,
    /// Serialized record body. The store never interprets it.
    pub data: Vec<u8>,
}

impl StoredRecord {
    pub fn new(seq: u64, data: Vec<u8>) -> Self {
        Self { seq, data }
    }

    /// Encode a serializable body with bincode.
    pub fn encode<T: Serialize>(seq: u64, body: &T) -> crate::StoreResult<Self> {
        let data = bincode::serialize(body)
            .map_err(|e| crate::StoreError::Serialization(e.to_string()))?;
        Ok(Self { seq, data })
    }

    /// Decode the body with bincode.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> crate::StoreResult<T> {
        bincode::deserialize(&self.data)
            .map_err(|e| crate::StoreError::Serialization(format!("seq {}: {e}", self.seq)))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A frame that failed its checksum or could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamagedFrame {
    /// 1-based position of the frame in its stream.
    pub seq: u64,
    /// Byte offset of the frame header.
    pub offset: u64,
    pub reason: String,
}

impl DamagedFrame {
    pub fn to_error(&self, stream: &str) -> crate::StoreError {
        crate::StoreError::CorruptRecord {
            stream: stream.to_string(),
            seq: self.seq,
            offset: self.offset,
            reason: self.reason.clone(),
        }
    }
}

/// Result of reading a stream that may contain a damaged frame.
///
/// `records` is the intact prefix; everything from `damaged.seq` on is
/// unreadable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamScan {
    pub records: Vec<StoredRecord>,
    pub damaged: Option<DamagedFrame>,
}

impl StreamScan {
    pub fn intact(records: Vec<StoredRecord>) -> Self {
        Self {
            records,
            damaged: None,
        }
    }

    pub fn is_intact(&self) -> bool {
        self.damaged.is_none()
    }

    /// The records, or the damage as a [`StoreError::CorruptRecord`](crate::StoreError::CorruptRecord).
    pub fn into_records(self, stream: &str) -> crate::StoreResult<Vec<StoredRecord>> {
        match self.damaged {
            Some(damaged) => Err(damaged.to_error(stream)),
            None => Ok(self.records),
        }
    }
}
