use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use uc_crypto::{CanonicalBytes, HashChainVerifier};
use uc_types::{Channel, Digest, RecordId, Timestamp};

use crate::error::LedgerError;

/// The running state of one channel's chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChainHead {
    /// Hash of the last sealed record, or [`Digest::GENESIS`].
    pub tip: Digest,
    /// Number of sealed records.
    pub len: u64,
    pub last_timestamp: Option<Timestamp>,
}

impl ChainHead {
    pub const EMPTY: Self = Self {
        tip: Digest::GENESIS,
        len: 0,
        last_timestamp: None,
    };

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn next_slot(&self) -> Slot {
        Slot {
            id: RecordId::new(self.len + 1),
            timestamp: Timestamp::after(self.last_timestamp),
            prev_hash: self.tip,
        }
    }
}

impl Default for ChainHead {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// The position a record is about to be sealed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub id: RecordId,
    pub timestamp: Timestamp,
    pub prev_hash: Digest,
}

/// Owner of the per-channel chain heads.
///
/// Each channel's head sits behind its own mutex. [`seal`](Self::seal) holds
/// that mutex across read-tip, hash, persist and advance, so two seals on the
/// same channel can never link to the same predecessor. The two channels
/// never share a lock.
#[derive(Debug, Default)]
pub struct HashChainBuilder {
    economic: Mutex<ChainHead>,
    quality: Mutex<ChainHead>,
}

impl HashChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from heads recovered at startup.
    pub fn from_heads(economic: ChainHead, quality: ChainHead) -> Self {
        Self {
            economic: Mutex::new(economic),
            quality: Mutex::new(quality),
        }
    }

    fn lock(&self, channel: Channel) -> Result<MutexGuard<'_, ChainHead>, LedgerError> {
        let head = match channel {
            Channel::Economic => &self.economic,
            Channel::Quality => &self.quality,
        };
        head.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Snapshot of a channel's head.
    pub fn head(&self, channel: Channel) -> Result<ChainHead, LedgerError> {
        Ok(*self.lock(channel)?)
    }

    /// Seal one record onto `channel`.
    ///
    /// `draft` builds the record for the offered slot along with its
    /// canonical bytes. The builder computes `hash = H(bytes || prev_hash)`
    /// and hands it to `commit`, which stamps and persists the record. The
    /// tip advances only after `commit` succeeds, so a failed write leaves
    /// the channel exactly as it was.
    ///
    /// With `expected_tip`, the seal fails with
    /// [`LedgerError::ChainConflict`] unless the current tip matches.
    pub fn seal<T>(
        &self,
        channel: Channel,
        expected_tip: Option<Digest>,
        draft: impl FnOnce(&Slot) -> Result<(T, CanonicalBytes), LedgerError>,
        commit: impl FnOnce(&mut T, Digest) -> Result<(), LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut head = self.lock(channel)?;
        if let Some(expected) = expected_tip {
            if expected != head.tip {
                return Err(LedgerError::ChainConflict {
                    channel,
                    expected,
                    actual: head.tip,
                });
            }
        }

        let slot = head.next_slot();
        let (mut sealed, bytes) = draft(&slot)?;
        let hash = HashChainVerifier::compute_hash(bytes.as_bytes(), &slot.prev_hash);
        commit(&mut sealed, hash)?;

        head.tip = hash;
        head.len = slot.id.seq();
        head.last_timestamp = Some(slot.timestamp);
        Ok(sealed)
    }
}
