use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("proof not found: {0}")]
    ProofNotFound(String),

    #[error("store error: {0}")]
    Store(#[from] uc_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] uc_ledger::LedgerError),

    #[error("proof error: {0}")]
    Proof(#[from] uc_proof::ProofError),
}

impl SdkError {
    /// The violated sub-check, when a proof was rejected by its constraints.
    pub fn violation(&self) -> Option<&uc_proof::Violation> {
        match self {
            Self::Proof(e) => e.violation(),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
