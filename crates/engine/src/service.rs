//! Screening service
//!
//! Orchestrates the screening lifecycle: provider search, archival of
//! superseded screenings, match persistence, the review state machine
//! with its cascade, aggregate status recomputation and the post-commit
//! case notification. Every mutation of a screening and its matches
//! happens inside one transaction.

use crate::cases::{CaseGateway, CaseNotification, CaseNotifier};
use crate::error::EngineResult;
use crate::provider::SearchProvider;
use chrono::Utc;
use sentinel_core::{
    MatchComment, MatchingLimits, ReviewDecision, ReviewOutcome, Screening, ScreeningAggregate,
    ScreeningConfig, ScreeningMatch, ScreeningScope, SearchQuery,
};
use sentinel_persistence::{
    CommentRepo, Database, MatchRepo, PersistenceError, ScreeningConfigRepo, ScreeningRepo,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Request to screen a counterparty
#[derive(Debug, Clone)]
pub struct CreateScreeningRequest {
    /// Decision-or-manual scope the screening runs in
    pub scope: ScreeningScope,
    /// Config naming the datasets to search
    pub config: ScreeningConfig,
    /// Per-organization matching limits
    pub limits: MatchingLimits,
    /// Counterparty attributes submitted for matching
    pub search_input: serde_json::Value,
}

/// A match with its comments pre-loaded, oldest comment first
#[derive(Debug, Clone)]
pub struct MatchDetail {
    pub record: ScreeningMatch,
    pub comments: Vec<MatchComment>,
}

impl MatchDetail {
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

/// A screening joined with its config and ordered matches
#[derive(Debug, Clone)]
pub struct ScreeningDetail {
    pub screening: Screening,
    pub config: ScreeningConfig,
    pub matches: Vec<MatchDetail>,
}

/// The screening match resolution engine
pub struct ScreeningService {
    db: Database,
    provider: Arc<dyn SearchProvider>,
    notifier: CaseNotifier,
}

impl ScreeningService {
    /// Build the service and spawn its case notification worker
    pub fn new(
        db: Database,
        provider: Arc<dyn SearchProvider>,
        cases: Arc<dyn CaseGateway>,
    ) -> Self {
        Self {
            db,
            provider,
            notifier: CaseNotifier::spawn(cases),
        }
    }

    /// Screen a counterparty: search the provider, archive prior
    /// screenings for the same scope, persist the ranked matches and the
    /// initial aggregate status.
    ///
    /// A total provider failure aborts without persisting anything. A
    /// partial provider result still creates the screening, flagged
    /// `is_partial` with the failing dataset codes recorded.
    pub async fn create_screening(
        &self,
        request: CreateScreeningRequest,
    ) -> EngineResult<Screening> {
        let query = SearchQuery {
            input: request.search_input,
            threshold: request.limits.match_threshold,
            limit: request.limits.match_limit,
        };

        // the provider call completes before the transaction opens, so
        // its latency never extends lock hold time
        let outcome = self.provider.search(&request.config, &query).await?;

        let mut screening = Screening::new(request.scope, &request.config.id, query);
        let matches = screening.ingest_hits(outcome, Utc::now());

        let mut tx = self.db.pool().begin().await.map_err(PersistenceError::from)?;
        let archived = ScreeningRepo::archive_prior(
            &mut tx,
            &screening.organization_id,
            &screening.counterparty_id,
            screening.decision_id.as_deref(),
            screening.updated_at,
        )
        .await?;
        ScreeningRepo::insert(&mut tx, &screening).await?;
        MatchRepo::insert_batch(&mut tx, &matches).await?;
        tx.commit().await.map_err(PersistenceError::from)?;

        info!(
            "Created screening {} for counterparty {} ({} matches, {} prior archived, status {})",
            screening.id,
            screening.counterparty_id,
            screening.number_of_matches,
            archived,
            screening.status
        );
        Ok(screening)
    }

    /// Apply a reviewer's decision to one match.
    ///
    /// Runs the whole state machine in one transaction: guards, the
    /// transition, the cascade to siblings on a confirmed hit, and the
    /// aggregate status recompute. After commit, a status change on a
    /// decision-linked screening is handed to the case notifier.
    /// Returns every match the operation touched.
    pub async fn review_match(
        &self,
        match_id: &str,
        decision: ReviewDecision,
        reviewer: &str,
    ) -> EngineResult<ReviewOutcome> {
        let mut tx = self.db.pool().begin().await.map_err(PersistenceError::from)?;

        let target = MatchRepo::get(&mut tx, match_id).await?;
        let screening = ScreeningRepo::get(&mut tx, &target.screening_id).await?;
        let matches = MatchRepo::list_for_screening(&mut tx, &screening.id).await?;

        let mut aggregate = ScreeningAggregate::new(screening, matches);
        let outcome = aggregate.review(match_id, decision, reviewer, Utc::now())?;

        for updated in &outcome.updated {
            MatchRepo::update_review(&mut tx, updated).await?;
        }
        if outcome.status_changed() {
            ScreeningRepo::update_status(
                &mut tx,
                &aggregate.screening.id,
                outcome.status,
                aggregate.screening.updated_at,
            )
            .await?;
        }
        tx.commit().await.map_err(PersistenceError::from)?;

        info!(
            "Reviewed match {} as {} on screening {} ({} matches touched, status {} -> {})",
            match_id,
            decision,
            aggregate.screening.id,
            outcome.updated.len(),
            outcome.previous_status,
            outcome.status
        );

        if outcome.status_changed() {
            if let Some(decision_id) = aggregate.screening.decision_id.clone() {
                self.notifier.enqueue(CaseNotification {
                    screening_id: aggregate.screening.id.clone(),
                    decision_id,
                    status: outcome.status,
                });
            }
        }

        Ok(outcome)
    }

    /// Append a reviewer comment to a match. No status side effects;
    /// terminal matches still accept comments.
    pub async fn add_comment(
        &self,
        match_id: &str,
        author: &str,
        text: &str,
    ) -> EngineResult<MatchComment> {
        let mut conn = self.db.pool().acquire().await.map_err(PersistenceError::from)?;

        // surface a proper not-found instead of a foreign key violation
        MatchRepo::get(&mut conn, match_id).await?;

        let comment = MatchComment::new(match_id, author, text);
        CommentRepo::insert(&mut conn, &comment).await?;
        Ok(comment)
    }

    /// List a decision's screenings joined with their config, matches in
    /// review order and each match's comments pre-loaded.
    pub async fn list_screenings(
        &self,
        decision_id: &str,
        include_archived: bool,
    ) -> EngineResult<Vec<ScreeningDetail>> {
        let mut conn = self.db.pool().acquire().await.map_err(PersistenceError::from)?;

        let screenings =
            ScreeningRepo::list_by_decision(&mut conn, decision_id, include_archived).await?;

        let mut details = Vec::with_capacity(screenings.len());
        for screening in screenings {
            let config = ScreeningConfigRepo::get(&mut conn, &screening.config_id).await?;
            let matches = MatchRepo::list_for_screening(&mut conn, &screening.id).await?;

            let ids: Vec<String> = matches.iter().map(|m| m.id.clone()).collect();
            let mut by_match: HashMap<String, Vec<MatchComment>> = HashMap::new();
            for comment in CommentRepo::list_for_matches(&mut conn, &ids).await? {
                by_match
                    .entry(comment.match_id.clone())
                    .or_default()
                    .push(comment);
            }

            let matches = matches
                .into_iter()
                .map(|record| {
                    let comments = by_match.remove(&record.id).unwrap_or_default();
                    MatchDetail { record, comments }
                })
                .collect();

            details.push(ScreeningDetail {
                screening,
                config,
                matches,
            });
        }
        Ok(details)
    }

    /// The underlying database, for host-application wiring
    pub fn database(&self) -> &Database {
        &self.db
    }
}
