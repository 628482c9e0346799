//! Search provider boundary
//!
//! The external watch-list search is consumed as an opaque ranked result.
//! The call happens entirely before any persistence transaction opens, so
//! provider latency never extends lock hold time.

use async_trait::async_trait;
use sentinel_core::{ScreeningConfig, SearchOutcome, SearchQuery};
use thiserror::Error;

/// Errors from the external search provider.
///
/// Only total failures are errors. Dataset-level failures travel inside
/// [`SearchOutcome`] as partial-result signals and never abort a
/// screening.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Search provider unavailable: {0}")]
    Unavailable(String),

    #[error("Search provider rejected the query: {0}")]
    Rejected(String),
}

/// The external watch-list search service
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search against the datasets of `config`.
    ///
    /// At-most-once per invocation; retries belong to the caller's
    /// transport layer.
    async fn search(
        &self,
        config: &ScreeningConfig,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, ProviderError>;
}
