use serde::Serialize;
use uc_types::{BatchId, Channel, Digest, Timestamp};

use crate::error::LedgerError;
use crate::query::{EconomicFilter, QualityFilter};
use crate::records::{EconomicEvent, LedgerEntry};
use crate::traits::LedgerReader;

/// One row of a batch's history.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailEntry {
    pub channel: Channel,
    pub label: String,
    pub timestamp: Timestamp,
    pub hash: Digest,
    pub submitted_by: String,
    pub summary: String,
}

/// The complete history of a produce batch across both channels.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTrail {
    pub batch_id: BatchId,
    /// Economic and quality records merged by timestamp.
    pub entries: Vec<TrailEntry>,
    pub economic_count: usize,
    pub quality_count: usize,
    /// Sum of `unitsSold` over SALE events.
    pub units_sold: f64,
    pub latest_quality_score: Option<u8>,
    pub spoilage_detected: bool,
}

impl BatchTrail {
    pub fn build<R: LedgerReader>(reader: &R, batch_id: &BatchId) -> Result<Self, LedgerError> {
        let economic = reader.query_economic(&EconomicFilter::new().batch(batch_id.clone()))?;
        let quality = reader.query_quality(&QualityFilter::new().batch(batch_id.clone()))?;

        let units_sold = economic
            .iter()
            .map(|r| match r.payload.event {
                EconomicEvent::Sale { units_sold, .. } => units_sold,
                _ => 0.0,
            })
            .sum();
        let latest_quality_score = quality.last().map(|r| r.payload.quality_score);
        let spoilage_detected = quality.iter().any(|r| r.payload.spoilage_detected);
        let economic_count = economic.len();
        let quality_count = quality.len();

        let mut merged: Vec<LedgerEntry> = economic
            .into_iter()
            .map(LedgerEntry::from)
            .chain(quality.into_iter().map(LedgerEntry::from))
            .collect();
        // Stable sort: within a channel, append order already matches time order.
        merged.sort_by_key(|entry| (entry.timestamp(), entry.channel()));

        let entries = merged
            .iter()
            .map(|entry| TrailEntry {
                channel: entry.channel(),
                label: entry.label(),
                timestamp: entry.timestamp(),
                hash: entry.hash(),
                submitted_by: entry.submitted_by().to_string(),
                summary: entry.summary(),
            })
            .collect();

        Ok(Self {
            batch_id: batch_id.clone(),
            entries,
            economic_count,
            quality_count,
            units_sold,
            latest_quality_score,
            spoilage_detected,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use uc_types::{ActorRef, ActorRole};

    use super::*;
    use crate::ledger::Ledger;
    use crate::records::{EconomicTx, PaymentMethod, QualityStage, QualityTx};
    use crate::traits::LedgerWriter;

    #[test]
    fn trail_merges_both_channels_for_one_batch() {
        let ledger = Ledger::in_memory();
        let farmer = ActorRef::new("did:farmer:1", ActorRole::Farmer);
        let retailer = ActorRef::new("did:retail:1", ActorRole::Retailer);

        ledger
            .append_economic(
                farmer.clone(),
                EconomicTx::new(
                    ActorRole::Farmer,
                    ActorRole::System,
                    "Wheat",
                    0.0,
                    PaymentMethod::Settlement,
                    EconomicEvent::Register {
                        variety: "Durum".into(),
                        farming_method: "Natural".into(),
                    },
                )
                .with_batch("W-1"),
            )
            .unwrap();
        ledger
            .append_quality(
                farmer.clone(),
                QualityTx::new(farmer.clone(), QualityStage::Harvest, 88, 10.0, 7.0).with_batch("W-1"),
            )
            .unwrap();
        ledger
            .append_quality(
                farmer.clone(),
                QualityTx::new(farmer.clone(), QualityStage::Harvest, 70, 10.0, 7.0).with_batch("W-2"),
            )
            .unwrap();
        ledger
            .append_economic(
                retailer.clone(),
                EconomicTx::new(
                    ActorRole::Retailer,
                    ActorRole::Consumer,
                    "Wheat",
                    120.0,
                    PaymentMethod::Cash,
                    EconomicEvent::Sale {
                        units_sold: 4.0,
                        sale_price_per_unit: 30.0,
                    },
                )
                .with_batch("W-1"),
            )
            .unwrap();

        let trail = BatchTrail::build(&ledger, &BatchId::new("W-1")).unwrap();
        assert_eq!(trail.economic_count, 2);
        assert_eq!(trail.quality_count, 1);
        assert_eq!(trail.entries.len(), 3);
        assert_eq!(trail.units_sold, 4.0);
        assert_eq!(trail.latest_quality_score, Some(88));
        assert!(!trail.spoilage_detected);
        assert!(trail
            .entries
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        assert_eq!(trail.entries[0].label, "ECO-000001");
        assert_eq!(trail.entries[0].submitted_by, "FARMER:did:farmer:1");

        assert!(BatchTrail::build(&ledger, &BatchId::new("none")).unwrap().is_empty());
    }
}
