use serde::Serialize;
use tracing::error;
use uc_crypto::{ChainError, HashChainVerifier};
use uc_store::{DamagedFrame, StoredRecord};
use uc_types::{Channel, Digest, RecordId, Timestamp};

use crate::error::LedgerError;
use crate::records::{ChannelPayload, Record};

/// Why a record failed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// `prevHash` is not the hash of the preceding record.
    BrokenLink,
    /// Stored hash differs from the hash recomputed over the record's fields.
    HashMismatch,
    /// Ids are not contiguous from 1.
    SequenceGap,
    /// Timestamp earlier than its predecessor's.
    TimestampRegression,
    /// Persisted bytes failed their checksum or could not be decoded or
    /// re-encoded.
    Undecodable,
}

/// The first record that failed verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainFailure {
    pub record_id: RecordId,
    pub label: String,
    pub kind: FailureKind,
    pub detail: String,
}

/// Outcome of verifying one channel from its persisted records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub channel: Channel,
    /// Records examined before stopping.
    pub record_count: u64,
    pub valid: bool,
    pub first_failure: Option<ChainFailure>,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Convert a failed report into [`LedgerError::IntegrityFailure`].
    pub fn into_result(self) -> Result<Self, LedgerError> {
        match &self.first_failure {
            Some(failure) => Err(LedgerError::IntegrityFailure {
                channel: self.channel,
                record_id: failure.record_id,
                reason: format!("{:?}: {}", failure.kind, failure.detail),
            }),
            None => Ok(self),
        }
    }

    /// Walk the stored records of one channel in order, stopping at the
    /// first failure. `damaged` marks where the readable prefix `stored`
    /// ends, if the stream did not read back whole.
    pub(crate) fn verify<P: ChannelPayload>(
        stored: &[StoredRecord],
        damaged: Option<&DamagedFrame>,
    ) -> Self {
        let channel = P::CHANNEL;
        let mut expected_prev = Digest::GENESIS;
        let mut last_timestamp: Option<Timestamp> = None;

        for (index, raw) in stored.iter().enumerate() {
            let seq = index as u64 + 1;
            let fail = |kind, detail: String| {
                Self::failed(channel, seq, RecordId::new(seq), kind, detail)
            };

            if raw.seq != seq {
                return fail(
                    FailureKind::SequenceGap,
                    format!("stored at position {} instead of {seq}", raw.seq),
                );
            }
            let record: Record<P> = match raw.decode() {
                Ok(record) => record,
                Err(e) => return fail(FailureKind::Undecodable, e.to_string()),
            };
            if record.id.seq() != seq {
                return fail(
                    FailureKind::SequenceGap,
                    format!("record carries id {} at position {seq}", record.id.seq()),
                );
            }
            if let Err(e) = HashChainVerifier::verify_link(&record, &expected_prev) {
                let kind = match e {
                    ChainError::GenesisMismatch { .. } | ChainError::BrokenLink { .. } => {
                        FailureKind::BrokenLink
                    }
                    ChainError::HashMismatch { .. } => FailureKind::HashMismatch,
                    ChainError::Unencodable { .. } => FailureKind::Undecodable,
                };
                return fail(kind, e.to_string());
            }
            if let Some(previous) = last_timestamp {
                if record.timestamp < previous {
                    return fail(
                        FailureKind::TimestampRegression,
                        format!("{} precedes {}", record.timestamp, previous),
                    );
                }
            }

            expected_prev = record.hash;
            last_timestamp = Some(record.timestamp);
        }

        if let Some(damaged) = damaged {
            return Self::failed(
                channel,
                damaged.seq,
                RecordId::new(damaged.seq),
                FailureKind::Undecodable,
                damaged.reason.clone(),
            );
        }

        Self {
            channel,
            record_count: stored.len() as u64,
            valid: true,
            first_failure: None,
        }
    }

    fn failed(
        channel: Channel,
        examined: u64,
        record_id: RecordId,
        kind: FailureKind,
        detail: String,
    ) -> Self {
        let label = record_id.label(channel);
        error!(%channel, record = %label, ?kind, %detail, "chain verification failed");
        Self {
            channel,
            record_count: examined,
            valid: false,
            first_failure: Some(ChainFailure {
                record_id,
                label,
                kind,
                detail,
            }),
        }
    }
}
