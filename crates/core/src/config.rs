//! # Screening Config Module
//!
//! Read-only configuration consumed by the engine: which watch-list
//! datasets a screening queries, and the per-organization matching limits.

use serde::{Deserialize, Serialize};

/// A screening configuration: the ordered set of watch-list datasets a
/// search runs against.
///
/// Owned and maintained outside the engine; the engine only reads it to
/// parametrize provider queries and to decorate listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Config version id (unique per edit)
    pub id: String,
    /// Stable id shared across versions of the same config
    pub stable_id: String,
    /// Human-readable name
    pub name: String,
    /// Ordered watch-list dataset identifiers used for the query
    pub datasets: Vec<String>,
}

/// Per-organization matching limits applied to every provider query
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchingLimits {
    /// Minimum provider score for a hit to be returned
    pub match_threshold: f64,
    /// Maximum number of hits the provider may return
    pub match_limit: u32,
}

impl Default for MatchingLimits {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            match_limit: 50,
        }
    }
}
