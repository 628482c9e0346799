//! # Review Module
//!
//! The match review state machine and the screening aggregate status
//! recomputer. The whole mutation (guard, transition, cascade, recompute)
//! runs on the in-memory aggregate so the invariants live in one place;
//! callers persist the returned diff atomically.

use crate::error::{DomainError, DomainResult};
use crate::matches::ScreeningMatch;
use crate::screening::Screening;
use crate::status::{MatchStatus, ScreeningStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reviewer's verdict on one match.
///
/// This is the closed set of states a human transition may target;
/// anything else is rejected at the parsing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// True positive
    ConfirmedHit,
    /// False positive
    NoHit,
    /// Resolved without review
    Skipped,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::ConfirmedHit => "confirmed_hit",
            ReviewDecision::NoHit => "no_hit",
            ReviewDecision::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmed_hit" => Some(ReviewDecision::ConfirmedHit),
            "no_hit" => Some(ReviewDecision::NoHit),
            "skipped" => Some(ReviewDecision::Skipped),
            _ => None,
        }
    }

    /// Parse a caller-supplied target status, failing on anything outside
    /// the closed set.
    pub fn parse(s: &str) -> DomainResult<Self> {
        Self::from_str(s).ok_or_else(|| DomainError::UnknownReviewDecision(s.to_string()))
    }

    pub fn as_match_status(&self) -> MatchStatus {
        match self {
            ReviewDecision::ConfirmedHit => MatchStatus::ConfirmedHit,
            ReviewDecision::NoHit => MatchStatus::NoHit,
            ReviewDecision::Skipped => MatchStatus::Skipped,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive a screening's aggregate status from its match statuses.
///
/// Rules, in priority order:
/// - any `confirmed_hit` match makes the screening `confirmed_hit`;
/// - any reviewable match (`pending`/`unknown`) keeps it `in_review`;
/// - otherwise (all resolved negative, or no matches at all) it is `no_hit`.
pub fn aggregate_status(statuses: impl IntoIterator<Item = MatchStatus>) -> ScreeningStatus {
    let mut in_review = false;
    for status in statuses {
        match status {
            MatchStatus::ConfirmedHit => return ScreeningStatus::ConfirmedHit,
            MatchStatus::Pending | MatchStatus::Unknown => in_review = true,
            MatchStatus::NoHit | MatchStatus::Skipped => {}
        }
    }
    if in_review {
        ScreeningStatus::InReview
    } else {
        ScreeningStatus::NoHit
    }
}

/// Result of one review operation
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Every match the operation touched: the reviewed match first,
    /// followed by cascade-skipped siblings
    pub updated: Vec<ScreeningMatch>,
    /// Aggregate status before the review
    pub previous_status: ScreeningStatus,
    /// Aggregate status after the review
    pub status: ScreeningStatus,
}

impl ReviewOutcome {
    /// Whether the review changed the screening's aggregate status
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.status
    }
}

/// A screening together with all of its matches, loaded for mutation.
///
/// The screening row is the mutation boundary: any write that touches a
/// match also recomputes the owning screening's status, so the two are
/// never persisted inconsistently.
#[derive(Debug, Clone)]
pub struct ScreeningAggregate {
    pub screening: Screening,
    pub matches: Vec<ScreeningMatch>,
}

impl ScreeningAggregate {
    pub fn new(screening: Screening, matches: Vec<ScreeningMatch>) -> Self {
        Self { screening, matches }
    }

    /// Apply a reviewer's decision to one match.
    ///
    /// Guards: the screening must be live (not archived, not finalized)
    /// and the match must still be reviewable. A `confirmed_hit` decision
    /// cascades: every other reviewable match is skipped with the same
    /// reviewer and timestamp. The aggregate status is recomputed before
    /// returning.
    pub fn review(
        &mut self,
        match_id: &str,
        decision: ReviewDecision,
        reviewer: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<ReviewOutcome> {
        if self.screening.is_archived {
            return Err(DomainError::ScreeningArchived {
                screening_id: self.screening.id.clone(),
            });
        }
        if self.screening.status.is_final() {
            return Err(DomainError::ScreeningFinalized {
                screening_id: self.screening.id.clone(),
                status: self.screening.status,
            });
        }

        let idx = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| DomainError::MatchNotFound(match_id.to_string()))?;

        if self.matches[idx].status.is_terminal() {
            return Err(DomainError::MatchAlreadyResolved {
                match_id: match_id.to_string(),
                status: self.matches[idx].status,
            });
        }

        let mut updated = Vec::new();

        {
            let target = &mut self.matches[idx];
            target.status = decision.as_match_status();
            target.reviewed_by = Some(reviewer.to_string());
            target.updated_at = now;
            updated.push(target.clone());
        }

        // One confirmed true positive resolves the triage: the remaining
        // candidates are skipped with the same reviewer and timestamp.
        if decision == ReviewDecision::ConfirmedHit {
            for sibling in self.matches.iter_mut().filter(|m| m.id != match_id) {
                if sibling.status.is_reviewable() {
                    sibling.status = MatchStatus::Skipped;
                    sibling.reviewed_by = Some(reviewer.to_string());
                    sibling.updated_at = now;
                    updated.push(sibling.clone());
                }
            }
        }

        let previous_status = self.screening.status;
        self.screening.status = aggregate_status(self.matches.iter().map(|m| m.status));
        self.screening.updated_at = now;

        Ok(ReviewOutcome {
            updated,
            previous_status,
            status: self.screening.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{ProviderHit, SearchOutcome};
    use crate::screening::{ScreeningScope, SearchQuery};
    use serde_json::json;

    fn aggregate_with_scores(scores: &[f64]) -> ScreeningAggregate {
        let scope = ScreeningScope {
            organization_id: "ORG_001".to_string(),
            counterparty_id: "CPT_001".to_string(),
            decision_id: Some("DEC_001".to_string()),
            requested_by: None,
        };
        let query = SearchQuery {
            input: json!({ "name": "Acme Holdings Ltd" }),
            threshold: 0.7,
            limit: 50,
        };
        let mut screening = Screening::new(scope, "CFG_001", query);
        let hits = scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                ProviderHit::new(format!("Q{i}"), *score, json!({ "score": score }))
            })
            .collect();
        let matches = screening.ingest_hits(SearchOutcome::complete(hits), Utc::now());
        ScreeningAggregate::new(screening, matches)
    }

    #[test]
    fn test_aggregate_status_rules() {
        use crate::status::MatchStatus::*;
        assert_eq!(
            aggregate_status(Vec::<MatchStatus>::new()),
            ScreeningStatus::NoHit
        );
        assert_eq!(aggregate_status([Pending, NoHit]), ScreeningStatus::InReview);
        assert_eq!(aggregate_status([Unknown]), ScreeningStatus::InReview);
        assert_eq!(
            aggregate_status([NoHit, Skipped]),
            ScreeningStatus::NoHit
        );
        assert_eq!(
            aggregate_status([Pending, ConfirmedHit, NoHit]),
            ScreeningStatus::ConfirmedHit
        );
    }

    #[test]
    fn test_confirm_cascades_to_siblings() {
        let mut agg = aggregate_with_scores(&[0.9, 0.5, 0.1]);
        let confirmed_id = agg.matches[0].id.clone();

        let outcome = agg
            .review(&confirmed_id, ReviewDecision::ConfirmedHit, "reviewer-1", Utc::now())
            .unwrap();

        // reviewed match first, then both cascaded siblings
        assert_eq!(outcome.updated.len(), 3);
        assert_eq!(outcome.updated[0].status, MatchStatus::ConfirmedHit);
        assert!(outcome.updated[1..]
            .iter()
            .all(|m| m.status == MatchStatus::Skipped));
        assert!(outcome
            .updated
            .iter()
            .all(|m| m.reviewed_by.as_deref() == Some("reviewer-1")));

        assert_eq!(outcome.previous_status, ScreeningStatus::InReview);
        assert_eq!(outcome.status, ScreeningStatus::ConfirmedHit);
        assert!(outcome.status_changed());
    }

    #[test]
    fn test_cascade_shares_one_timestamp() {
        let mut agg = aggregate_with_scores(&[0.9, 0.5]);
        let id = agg.matches[0].id.clone();
        let now = Utc::now();
        agg.review(&id, ReviewDecision::ConfirmedHit, "reviewer-1", now)
            .unwrap();
        assert!(agg.matches.iter().all(|m| m.updated_at == now));
    }

    #[test]
    fn test_no_hit_leaves_siblings_pending() {
        let mut agg = aggregate_with_scores(&[0.9, 0.5]);
        let id = agg.matches[0].id.clone();

        let outcome = agg
            .review(&id, ReviewDecision::NoHit, "reviewer-1", Utc::now())
            .unwrap();

        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(agg.matches[1].status, MatchStatus::Pending);
        assert_eq!(outcome.status, ScreeningStatus::InReview);
        assert!(!outcome.status_changed());
    }

    #[test]
    fn test_resolving_last_match_closes_screening() {
        let mut agg = aggregate_with_scores(&[0.9]);
        let id = agg.matches[0].id.clone();

        let outcome = agg
            .review(&id, ReviewDecision::NoHit, "reviewer-1", Utc::now())
            .unwrap();

        assert_eq!(outcome.status, ScreeningStatus::NoHit);
        assert!(outcome.status_changed());
    }

    #[test]
    fn test_terminal_match_rejects_review() {
        let mut agg = aggregate_with_scores(&[0.9, 0.5]);
        let id = agg.matches[0].id.clone();
        agg.review(&id, ReviewDecision::NoHit, "reviewer-1", Utc::now())
            .unwrap();

        let err = agg
            .review(&id, ReviewDecision::ConfirmedHit, "reviewer-2", Utc::now())
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_finalized_screening_rejects_review() {
        let mut agg = aggregate_with_scores(&[0.9, 0.5, 0.1]);
        let first = agg.matches[0].id.clone();
        agg.review(&first, ReviewDecision::ConfirmedHit, "reviewer-1", Utc::now())
            .unwrap();

        // every sibling is now skipped, but even a fresh id is rejected
        // before the match lookup happens
        let err = agg
            .review("MTC_OTHER", ReviewDecision::NoHit, "reviewer-2", Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::ScreeningFinalized { .. }));
    }

    #[test]
    fn test_archived_screening_rejects_review() {
        let mut agg = aggregate_with_scores(&[0.9]);
        agg.screening.is_archived = true;
        let id = agg.matches[0].id.clone();

        let err = agg
            .review(&id, ReviewDecision::NoHit, "reviewer-1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::ScreeningArchived { .. }));
    }

    #[test]
    fn test_unknown_match_id() {
        let mut agg = aggregate_with_scores(&[0.9]);
        let err = agg
            .review("MTC_404", ReviewDecision::NoHit, "reviewer-1", Utc::now())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_skip_single_pending_match() {
        let mut agg = aggregate_with_scores(&[0.9]);
        let id = agg.matches[0].id.clone();
        let outcome = agg
            .review(&id, ReviewDecision::Skipped, "reviewer-1", Utc::now())
            .unwrap();
        assert_eq!(outcome.status, ScreeningStatus::NoHit);
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(
            ReviewDecision::parse("confirmed_hit").unwrap(),
            ReviewDecision::ConfirmedHit
        );
        let err = ReviewDecision::parse("pending").unwrap_err();
        assert!(err.is_validation());
    }
}
