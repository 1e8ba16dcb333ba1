use serde::{Deserialize, Serialize};
use uc_types::{ActorRole, BatchId};

use crate::records::{EconomicRecord, QualityRecord, QualityStage};

/// Filter for economic queries. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicFilter {
    pub batch_id: Option<BatchId>,
    pub from_party: Option<ActorRole>,
    pub to_party: Option<ActorRole>,
}

impl EconomicFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(mut self, batch_id: impl Into<BatchId>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn from_party(mut self, role: ActorRole) -> Self {
        self.from_party = Some(role);
        self
    }

    pub fn to_party(mut self, role: ActorRole) -> Self {
        self.to_party = Some(role);
        self
    }

    pub fn matches(&self, record: &EconomicRecord) -> bool {
        let tx = &record.payload;
        self.batch_id
            .as_ref()
            .map_or(true, |b| tx.batch_id.as_ref() == Some(b))
            && self.from_party.map_or(true, |r| tx.from_party == r)
            && self.to_party.map_or(true, |r| tx.to_party == r)
    }
}

/// Filter for quality queries. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityFilter {
    pub batch_id: Option<BatchId>,
    pub stage: Option<QualityStage>,
}

impl QualityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(mut self, batch_id: impl Into<BatchId>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn stage(mut self, stage: QualityStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn matches(&self, record: &QualityRecord) -> bool {
        let tx = &record.payload;
        self.batch_id
            .as_ref()
            .map_or(true, |b| tx.batch_id.as_ref() == Some(b))
            && self.stage.map_or(true, |s| tx.stage == s)
    }
}
