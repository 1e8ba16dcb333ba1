use uc_types::{ActorRef, Channel};

use crate::chain::ChainHead;
use crate::error::LedgerError;
use crate::query::{EconomicFilter, QualityFilter};
use crate::records::{EconomicRecord, EconomicTx, QualityRecord, QualityTx};

/// Write boundary for ledger appends.
pub trait LedgerWriter: Send + Sync {
    /// Validate, seal on the Economic channel, persist, and return the record.
    fn append_economic(
        &self,
        submitted_by: ActorRef,
        tx: EconomicTx,
    ) -> Result<EconomicRecord, LedgerError>;

    /// Validate, seal on the Quality channel, persist, and return the record.
    fn append_quality(
        &self,
        submitted_by: ActorRef,
        tx: QualityTx,
    ) -> Result<QualityRecord, LedgerError>;
}

/// Read boundary for ledger queries.
pub trait LedgerReader: Send + Sync {
    /// Every economic record in append order.
    fn economic_records(&self) -> Result<Vec<EconomicRecord>, LedgerError>;

    /// Every quality record in append order.
    fn quality_records(&self) -> Result<Vec<QualityRecord>, LedgerError>;

    fn head(&self, channel: Channel) -> Result<ChainHead, LedgerError>;

    fn len(&self, channel: Channel) -> Result<u64, LedgerError> {
        Ok(self.head(channel)?.len)
    }

    /// Economic records matching every set filter field, oldest first.
    fn query_economic(&self, filter: &EconomicFilter) -> Result<Vec<EconomicRecord>, LedgerError> {
        Ok(self
            .economic_records()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// Quality records matching every set filter field, oldest first.
    fn query_quality(&self, filter: &QualityFilter) -> Result<Vec<QualityRecord>, LedgerError> {
        Ok(self
            .quality_records()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }
}
