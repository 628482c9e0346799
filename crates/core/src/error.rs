//! # Error Module
//!
//! Domain errors for the screening engine, using thiserror.

use crate::status::{MatchStatus, ScreeningStatus};
use thiserror::Error;

/// Core domain errors.
///
/// Business-rule violations only; infrastructure errors live in the
/// persistence and engine crates.
#[derive(Debug, Error)]
pub enum DomainError {
    // === Conflict errors ===
    #[error("Match already resolved: {match_id} (status: {status})")]
    MatchAlreadyResolved {
        match_id: String,
        status: MatchStatus,
    },

    #[error("Screening is archived: {screening_id}")]
    ScreeningArchived { screening_id: String },

    #[error("Screening is finalized: {screening_id} (status: {status})")]
    ScreeningFinalized {
        screening_id: String,
        status: ScreeningStatus,
    },

    // === Not found errors ===
    #[error("Match not found: {0}")]
    MatchNotFound(String),

    // === Validation errors ===
    #[error("Unknown review decision: {0}")]
    UnknownReviewDecision(String),

    #[error("Unknown match status: {0}")]
    UnknownMatchStatus(String),

    #[error("Unknown screening status: {0}")]
    UnknownScreeningStatus(String),
}

/// Result type alias with DomainError
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Check whether this is a conflict (illegal transition) error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::MatchAlreadyResolved { .. }
                | DomainError::ScreeningArchived { .. }
                | DomainError::ScreeningFinalized { .. }
        )
    }

    /// Check whether this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::MatchNotFound(_))
    }

    /// Check whether this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownReviewDecision(_)
                | DomainError::UnknownMatchStatus(_)
                | DomainError::UnknownScreeningStatus(_)
        )
    }
}
