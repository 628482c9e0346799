//! # Comment Module
//!
//! Append-only reviewer comments attached to a match. Comments are never
//! updated or deleted; together they reconstruct the review narrative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reviewer comment on a screening match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchComment {
    pub id: String,
    /// Owning match
    pub match_id: String,
    pub commented_by: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl MatchComment {
    pub fn new(match_id: &str, commented_by: &str, comment: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            match_id: match_id.to_string(),
            commented_by: commented_by.to_string(),
            comment: comment.to_string(),
            created_at: Utc::now(),
        }
    }
}
