//! # Ranking Module
//!
//! Raw provider results and the ranking rules applied before persistence:
//! dedup by external entity id (highest score wins) and score-descending
//! order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One raw hit returned by the watch-list search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHit {
    /// External watch-list entity id
    pub entity_id: String,
    /// Provider matching score, higher is a stronger candidate
    pub score: f64,
    /// Sub-queries of the search that produced this hit
    pub query_ids: Vec<String>,
    /// Dataset provenance
    pub datasets: Vec<String>,
    /// Provider already performed its secondary lookup
    pub enriched: bool,
    /// Provider-supplied review hint; absent when the provider is degraded
    pub status_hint: Option<String>,
    /// Opaque provider record, carried verbatim into the match
    pub payload: serde_json::Value,
}

impl ProviderHit {
    pub fn new(entity_id: impl Into<String>, score: f64, payload: serde_json::Value) -> Self {
        Self {
            entity_id: entity_id.into(),
            score,
            query_ids: Vec::new(),
            datasets: Vec::new(),
            enriched: false,
            status_hint: Some("candidate".to_string()),
            payload,
        }
    }

    pub fn with_query_ids(mut self, query_ids: Vec<String>) -> Self {
        self.query_ids = query_ids;
        self
    }

    pub fn with_datasets(mut self, datasets: Vec<String>) -> Self {
        self.datasets = datasets;
        self
    }

    /// Drop the review hint, marking the hit as degraded
    pub fn without_status_hint(mut self) -> Self {
        self.status_hint = None;
        self
    }
}

/// The full result of one provider search
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Raw hits, before dedup and ranking
    pub hits: Vec<ProviderHit>,
    /// True when some datasets failed or the result set was truncated
    pub partial: bool,
    /// Provider error codes for the failed datasets
    pub error_codes: Vec<String>,
}

impl SearchOutcome {
    /// A fully successful search
    pub fn complete(hits: Vec<ProviderHit>) -> Self {
        Self {
            hits,
            partial: false,
            error_codes: Vec::new(),
        }
    }

    /// A degraded search: some datasets failed but the rest returned
    pub fn degraded(hits: Vec<ProviderHit>, error_codes: Vec<String>) -> Self {
        Self {
            hits,
            partial: true,
            error_codes,
        }
    }
}

/// Dedup and rank raw hits for persistence.
///
/// No two hits may share an entity id; the highest-score occurrence wins.
/// The survivors are ordered by score descending, entity id as tie-break,
/// so persistence order is deterministic.
pub fn rank_hits(hits: Vec<ProviderHit>) -> Vec<ProviderHit> {
    let mut best: HashMap<String, ProviderHit> = HashMap::new();
    for hit in hits {
        match best.get(&hit.entity_id) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.entity_id.clone(), hit);
            }
        }
    }

    let mut ranked: Vec<ProviderHit> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(entity_id: &str, score: f64) -> ProviderHit {
        ProviderHit::new(entity_id, score, json!({ "score": score }))
    }

    #[test]
    fn test_rank_orders_by_score_descending() {
        let ranked = rank_hits(vec![hit("a", 0.2), hit("b", 0.9), hit("c", 0.5)]);
        let ids: Vec<&str> = ranked.iter().map(|h| h.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_dedups_keeping_highest_score() {
        let ranked = rank_hits(vec![hit("a", 0.3), hit("b", 0.6), hit("a", 0.8)]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entity_id, "a");
        assert_eq!(ranked[0].score, 0.8);
    }

    #[test]
    fn test_rank_ties_break_on_entity_id() {
        let ranked = rank_hits(vec![hit("z", 0.5), hit("a", 0.5)]);
        let ids: Vec<&str> = ranked.iter().map(|h| h.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[test]
    fn test_degraded_outcome_records_error_codes() {
        let outcome = SearchOutcome::degraded(vec![hit("a", 0.4)], vec!["EU_FSF".to_string()]);
        assert!(outcome.partial);
        assert_eq!(outcome.error_codes, vec!["EU_FSF".to_string()]);
    }
}
