use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{validate_stream, StoreError, StoreResult};
use crate::record::{DamagedFrame, StoredRecord, StreamScan};
use crate::traits::RecordStore;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Flush/sync strategy for segment files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    #[default]
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    OsDefault,
}

/// Configuration for the file-backed store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    pub sync_mode: SyncMode,
}

/// Open segment file for one stream.
struct Segment {
    path: PathBuf,
    file: File,
    /// Byte length of the valid prefix of the file.
    offset: u64,
    /// Number of records in the file.
    count: u64,
    /// First damaged frame found when the segment was opened.
    damaged: Option<DamagedFrame>,
}

/// File-backed record store: one segment file per stream.
///
/// On-disk frame format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized StoredRecord)]
/// ```
///
/// A frame cut short at the end of a file is the remnant of an append that
/// never completed; it is truncated away when the segment is opened. A frame
/// with a bad checksum anywhere else is corruption: [`scan`](RecordStore::scan)
/// reports its position, every other read of that stream fails, and the
/// stream refuses further appends.
pub struct FileRecordStore {
    root: PathBuf,
    config: FileStoreConfig,
    segments: RwLock<HashMap<String, Arc<Mutex<Segment>>>>,
}

impl FileRecordStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: &Path, config: FileStoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        debug!(root = %root.display(), sync = ?config.sync_mode, "file store opened");
        Ok(Self {
            root: root.to_path_buf(),
            config,
            segments: RwLock::new(HashMap::new()),
        })
    }

    /// Directory holding the segment files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the segment file backing `stream`.
    pub fn segment_path(&self, stream: &str) -> PathBuf {
        self.root.join(format!("{stream}.log"))
    }

    fn segment(&self, stream: &str) -> StoreResult<Arc<Mutex<Segment>>> {
        validate_stream(stream)?;
        {
            let segments = self.segments.read().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(segment) = segments.get(stream) {
                return Ok(Arc::clone(segment));
            }
        }

        let mut segments = self.segments.write().map_err(|_| StoreError::LockPoisoned)?;
        if let Some(segment) = segments.get(stream) {
            return Ok(Arc::clone(segment));
        }
        let segment = Arc::new(Mutex::new(self.open_segment(stream)?));
        segments.insert(stream.to_string(), Arc::clone(&segment));
        Ok(segment)
    }

    fn open_segment(&self, stream: &str) -> StoreResult<Segment> {
        let path = self.segment_path(stream);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let scan = scan_frames(&path)?;
        let file_len = file.metadata()?.len();
        if let Some(damaged) = &scan.damaged {
            warn!(
                stream,
                seq = damaged.seq,
                offset = damaged.offset,
                reason = %damaged.reason,
                "segment holds a damaged frame"
            );
        } else if scan.valid_len < file_len {
            warn!(
                stream,
                valid_len = scan.valid_len,
                file_len,
                "truncating incomplete trailing frame"
            );
            file.set_len(scan.valid_len)?;
        }

        debug!(stream, records = scan.records.len(), "segment opened");
        Ok(Segment {
            path,
            file,
            offset: scan.valid_len,
            count: scan.records.len() as u64,
            damaged: scan.damaged,
        })
    }
}

impl RecordStore for FileRecordStore {
    fn append(&self, stream: &str, record: &StoredRecord) -> StoreResult<()> {
        let segment = self.segment(stream)?;
        let mut seg = segment.lock().map_err(|_| StoreError::LockPoisoned)?;
        if let Some(damaged) = &seg.damaged {
            return Err(damaged.to_error(stream));
        }

        let expected = seg.count + 1;
        if record.seq != expected {
            return Err(StoreError::SequenceGap {
                stream: stream.to_string(),
                expected,
                actual: record.seq,
            });
        }

        let payload =
            bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len())
            .map_err(|_| StoreError::Serialization("record exceeds 4 GiB".into()))?;
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        let written = seg.file.write_all(&frame).and_then(|()| match self.config.sync_mode {
            SyncMode::EveryWrite => seg.file.sync_data(),
            SyncMode::OsDefault => Ok(()),
        });
        if let Err(e) = written {
            // Roll the file back so the stream is exactly as before.
            let offset = seg.offset;
            if let Err(rollback) = seg.file.set_len(offset) {
                warn!(stream, offset, error = %rollback, "rollback after failed append failed");
            }
            return Err(e.into());
        }

        seg.offset += frame.len() as u64;
        seg.count += 1;
        debug!(stream, seq = record.seq, len = payload.len(), "record appended");
        Ok(())
    }

    fn read_all(&self, stream: &str) -> StoreResult<Vec<StoredRecord>> {
        self.scan(stream)?.into_records(stream)
    }

    fn scan(&self, stream: &str) -> StoreResult<StreamScan> {
        let segment = self.segment(stream)?;
        let seg = segment.lock().map_err(|_| StoreError::LockPoisoned)?;
        let scan = scan_frames(&seg.path)?;
        // Bytes past `offset` belong to no completed append.
        let mut records = scan.records;
        records.truncate(seg.count as usize);
        Ok(StreamScan {
            records,
            damaged: scan.damaged,
        })
    }

    fn len(&self, stream: &str) -> StoreResult<u64> {
        let segment = self.segment(stream)?;
        let seg = segment.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(seg.count)
    }
}

impl std::fmt::Debug for FileRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRecordStore")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}

struct Scan {
    records: Vec<StoredRecord>,
    /// Length of the prefix made of intact frames.
    valid_len: u64,
    damaged: Option<DamagedFrame>,
}

/// Read a segment front-to-back.
///
/// Stops quietly at an incomplete trailing frame. Stops at the first frame
/// with a bad checksum, undecodable payload, or out-of-order sequence
/// number and records where it is.
fn scan_frames(path: &Path) -> StoreResult<Scan> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    let mut records: Vec<StoredRecord> = Vec::new();
    let mut damaged = None;
    let mut offset = 0usize;
    while offset + HEADER_SIZE <= bytes.len() {
        let header = &bytes[offset..offset + HEADER_SIZE];
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let start = offset + HEADER_SIZE;
        let end = start + length;
        if end > bytes.len() {
            break;
        }
        let expected_seq = records.len() as u64 + 1;
        match decode_frame(&bytes[start..end], expected_crc, expected_seq) {
            Ok(record) => records.push(record),
            Err(reason) => {
                damaged = Some(DamagedFrame {
                    seq: expected_seq,
                    offset: offset as u64,
                    reason,
                });
                break;
            }
        }
        offset = end;
    }

    Ok(Scan {
        records,
        valid_len: offset as u64,
        damaged,
    })
}

fn decode_frame(payload: &[u8], expected_crc: u32, expected_seq: u64) -> Result<StoredRecord, String> {
    if payload.is_empty() {
        return Err("zero-length frame".into());
    }
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(format!(
            "crc mismatch: expected {expected_crc:08x}, got {actual_crc:08x}"
        ));
    }
    let record: StoredRecord = bincode::deserialize(payload).map_err(|e| e.to_string())?;
    if record.seq != expected_seq {
        return Err(format!("expected seq {expected_seq}, found {}", record.seq));
    }
    Ok(record)
}
