//! # Match Module
//!
//! A ScreeningMatch is one candidate watch-list entity returned for a
//! screening, subject to human review.

use crate::ranking::ProviderHit;
use crate::status::MatchStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One candidate match of a screening.
///
/// Exclusively owned by its screening; deleting the screening cascades.
/// Status moves monotonically toward a terminal state, after which only
/// comments may still be appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningMatch {
    pub id: String,
    /// Owning screening
    pub screening_id: String,
    /// External watch-list entity reference
    pub open_sanction_entity_id: String,
    pub status: MatchStatus,
    /// Sub-queries of the search that produced this hit
    pub query_ids: Vec<String>,
    pub counterparty_id: String,
    /// Provider score, denormalized from the payload for ordering
    pub score: f64,
    /// Opaque provider record
    pub payload: serde_json::Value,
    /// Provider performed its secondary lookup
    pub enriched: bool,
    /// Reviewer who resolved the match, if any
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScreeningMatch {
    /// Build a match from a ranked provider hit.
    ///
    /// Hits carrying a status hint start at `pending`; degraded hits
    /// without one start at `unknown`.
    pub fn from_hit(
        screening_id: &str,
        counterparty_id: &str,
        hit: ProviderHit,
        now: DateTime<Utc>,
    ) -> Self {
        let status = if hit.status_hint.is_some() {
            MatchStatus::Pending
        } else {
            MatchStatus::Unknown
        };

        Self {
            id: Uuid::new_v4().to_string(),
            screening_id: screening_id.to_string(),
            open_sanction_entity_id: hit.entity_id,
            status,
            query_ids: hit.query_ids,
            counterparty_id: counterparty_id.to_string(),
            score: hit.score,
            payload: hit.payload,
            enriched: hit.enriched,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}
