//! Engine errors
//!
//! One error type for the whole service layer, wrapping the domain,
//! persistence and provider errors it orchestrates.

use crate::provider::ProviderError;
use sentinel_core::DomainError;
use sentinel_persistence::PersistenceError;
use thiserror::Error;

/// Errors surfaced by screening engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// The external search failed entirely; no screening was created
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Illegal transition: terminal match, archived or finalized screening
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Domain(e) if e.is_conflict())
    }

    /// Referenced screening, match or decision does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            EngineError::Domain(e) => e.is_not_found(),
            EngineError::Persistence(e) => e.is_not_found(),
            EngineError::Provider(_) => false,
        }
    }

    /// Malformed input, e.g. an unknown target status value
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Domain(e) if e.is_validation())
    }
}
