//! # Screening Module
//!
//! A Screening is one execution of a watch-list search against a
//! counterparty, together with its resulting candidate matches. At most
//! one non-archived screening exists per (organization, counterparty,
//! decision-or-manual scope); re-screening archives the predecessors.

use crate::ranking::{rank_hits, SearchOutcome};
use crate::review::aggregate_status;
use crate::status::ScreeningStatus;
use crate::ScreeningMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The scope a screening was requested in.
///
/// Decision-triggered screenings carry the decision id; manual screenings
/// carry none and are scoped per (organization, counterparty) instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningScope {
    pub organization_id: String,
    pub counterparty_id: String,
    pub decision_id: Option<String>,
    /// User who requested a manual screening
    pub requested_by: Option<String>,
}

impl ScreeningScope {
    pub fn is_manual(&self) -> bool {
        self.decision_id.is_none()
    }
}

/// The exact request sent to the search provider, kept on the screening
/// for reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Counterparty attributes submitted for matching
    pub input: serde_json::Value,
    /// Minimum score for a hit to be returned
    pub threshold: f64,
    /// Maximum number of hits to return
    pub limit: u32,
}

/// One watch-list screening run for a counterparty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub id: String,
    /// Decision that triggered the screening; None for manual runs
    pub decision_id: Option<String>,
    pub organization_id: String,
    pub config_id: String,
    pub status: ScreeningStatus,
    /// Counterparty attributes submitted for matching
    pub search_input: serde_json::Value,
    /// Full provider request, kept for reproducibility
    pub initial_query: SearchQuery,
    pub counterparty_id: String,
    pub match_threshold: f64,
    pub match_limit: u32,
    pub is_manual: bool,
    pub requested_by: Option<String>,
    /// Provider returned a truncated or degraded result set
    pub is_partial: bool,
    /// Superseded by a newer screening for the same scope
    pub is_archived: bool,
    /// Whether the provider returned any hits at creation time
    pub initial_has_matches: bool,
    /// Provider error codes for the failed datasets
    pub error_codes: Vec<String>,
    /// Count of persisted matches, frozen at creation
    pub number_of_matches: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Screening {
    /// Create a screening shell for a scope and provider query.
    ///
    /// The shell has no matches yet; [`Screening::ingest_hits`] ranks the
    /// provider result and derives the initial aggregate status.
    pub fn new(scope: ScreeningScope, config_id: &str, query: SearchQuery) -> Self {
        let now = Utc::now();
        let is_manual = scope.is_manual();
        Self {
            id: Uuid::new_v4().to_string(),
            decision_id: scope.decision_id,
            organization_id: scope.organization_id,
            config_id: config_id.to_string(),
            status: ScreeningStatus::NoHit,
            search_input: query.input.clone(),
            match_threshold: query.threshold,
            match_limit: query.limit,
            initial_query: query,
            counterparty_id: scope.counterparty_id,
            is_manual,
            requested_by: scope.requested_by,
            is_partial: false,
            is_archived: false,
            initial_has_matches: false,
            error_codes: Vec::new(),
            number_of_matches: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ingest a provider search outcome: dedup and rank the hits, build
    /// the match records, record partial-result signals and freeze
    /// `number_of_matches`. Returns the matches for persistence.
    pub fn ingest_hits(&mut self, outcome: SearchOutcome, now: DateTime<Utc>) -> Vec<ScreeningMatch> {
        let matches: Vec<ScreeningMatch> = rank_hits(outcome.hits)
            .into_iter()
            .map(|hit| ScreeningMatch::from_hit(&self.id, &self.counterparty_id, hit, now))
            .collect();

        self.is_partial = outcome.partial;
        self.error_codes = outcome.error_codes;
        self.initial_has_matches = !matches.is_empty();
        self.number_of_matches = matches.len() as u32;
        self.status = aggregate_status(matches.iter().map(|m| m.status));
        self.updated_at = now;

        matches
    }
}
