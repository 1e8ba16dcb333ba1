use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::TypeError;

/// Position of a record within its channel, starting at 1.
///
/// Ids are assigned by the ledger at append time and increase by exactly one
/// per record, so id order equals append order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Id of the first record on a channel.
    pub const FIRST: Self = Self(1);

    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    pub fn seq(&self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Channel-qualified label, e.g. `ECO-000042`.
    pub fn label(&self, channel: Channel) -> String {
        format!("{}-{:06}", channel.id_prefix(), self.0)
    }

    /// Parse either a bare number or a channel-qualified label.
    pub fn parse_label(s: &str) -> Result<Self, TypeError> {
        let digits = s.rsplit('-').next().unwrap_or(s);
        digits
            .parse::<u64>()
            .ok()
            .filter(|seq| *seq > 0)
            .map(Self)
            .ok_or_else(|| TypeError::InvalidRecordId(s.to_string()))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Correlation key for a unit of produce (e.g. `BATCH-7Q2K9X`).
///
/// Used to group ledger and proof records; never used for chaining.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a proof record (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofId(uuid::Uuid);

impl ProofId {
    /// Generate a new time-ordered proof ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Parse from the canonical hyphenated form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidUuid(e.to_string()))
    }

    /// First 8 characters of the UUID.
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ProofId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofId({})", self.short_id())
    }
}

impl fmt::Display for ProofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
