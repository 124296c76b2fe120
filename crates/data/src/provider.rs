//! Log source abstraction.
//!
//! The trace store talks to the chain through this trait so that ingestion
//! logic can be exercised against scripted providers in tests, with the
//! JSON-RPC client as the production implementation.

use async_trait::async_trait;
use primitive_types::H256;
use thiserror::Error;

use crate::events::RawLog;

/// Failures surfaced by a log provider.
///
/// Both variants are recoverable by the ingestion policy: an oversized
/// window shrinks the batch, anything else pauses and retries. Neither
/// aborts a sync on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("requested block range is too large for the provider")]
    RangeTooLarge,
    #[error("transient provider failure: {0}")]
    Transient(String),
}

/// Inclusive block window plus topic filter, scoped to one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub from_block: u64,
    pub to_block: u64,
    pub address: String,
    /// Matches any of these topics in position zero.
    pub topics: Vec<H256>,
}

/// Read-only view of an external log source.
#[async_trait]
pub trait LogProvider {
    /// Current chain head.
    async fn latest_block(&self) -> Result<u64, ProviderError>;

    /// All matching logs inside the query window.
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, ProviderError>;
}
