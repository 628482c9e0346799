//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables. The tables are defined
//! in migrations/0001_screenings.sql. JSON-valued columns (query sets,
//! error codes, payloads) are stored as TEXT and decoded on the way out.

use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sentinel_core::{
    MatchComment, MatchStatus, Screening, ScreeningConfig, ScreeningMatch, ScreeningStatus,
    SearchQuery,
};

/// Row type for the `screenings` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ScreeningRow {
    pub id: String,
    pub decision_id: Option<String>,
    pub organization_id: String,
    pub config_id: String,
    pub status: String,
    pub search_input: String,
    pub initial_query: String,
    pub counterparty_id: String,
    pub match_threshold: f64,
    pub match_limit: i64,
    pub is_manual: bool,
    pub requested_by: Option<String>,
    pub is_partial: bool,
    pub is_archived: bool,
    pub initial_has_matches: bool,
    pub error_codes: String,
    pub number_of_matches: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScreeningRow> for Screening {
    type Error = PersistenceError;

    fn try_from(row: ScreeningRow) -> Result<Self, Self::Error> {
        let status = ScreeningStatus::from_str(&row.status).ok_or_else(|| {
            PersistenceError::InvalidEnumValue {
                field: "screenings.status".to_string(),
                value: row.status.clone(),
            }
        })?;
        let initial_query: SearchQuery = serde_json::from_str(&row.initial_query)?;

        Ok(Screening {
            id: row.id,
            decision_id: row.decision_id,
            organization_id: row.organization_id,
            config_id: row.config_id,
            status,
            search_input: serde_json::from_str(&row.search_input)?,
            initial_query,
            counterparty_id: row.counterparty_id,
            match_threshold: row.match_threshold,
            match_limit: row.match_limit as u32,
            is_manual: row.is_manual,
            requested_by: row.requested_by,
            is_partial: row.is_partial,
            is_archived: row.is_archived,
            initial_has_matches: row.initial_has_matches,
            error_codes: serde_json::from_str(&row.error_codes)?,
            number_of_matches: row.number_of_matches as u32,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for the `screening_matches` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct MatchRow {
    pub id: String,
    pub screening_id: String,
    pub open_sanction_entity_id: String,
    pub status: String,
    pub query_ids: String,
    pub counterparty_id: String,
    pub score: f64,
    pub payload: String,
    pub enriched: bool,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for ScreeningMatch {
    type Error = PersistenceError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let status = MatchStatus::from_str(&row.status).ok_or_else(|| {
            PersistenceError::InvalidEnumValue {
                field: "screening_matches.status".to_string(),
                value: row.status.clone(),
            }
        })?;

        Ok(ScreeningMatch {
            id: row.id,
            screening_id: row.screening_id,
            open_sanction_entity_id: row.open_sanction_entity_id,
            status,
            query_ids: serde_json::from_str(&row.query_ids)?,
            counterparty_id: row.counterparty_id,
            score: row.score,
            payload: serde_json::from_str(&row.payload)?,
            enriched: row.enriched,
            reviewed_by: row.reviewed_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for the `screening_match_comments` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: String,
    pub match_id: String,
    pub commented_by: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for MatchComment {
    fn from(row: CommentRow) -> Self {
        MatchComment {
            id: row.id,
            match_id: row.match_id,
            commented_by: row.commented_by,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// Row type for the `screening_configs` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ConfigRow {
    pub id: String,
    pub stable_id: String,
    pub name: String,
    pub datasets: String,
}

impl TryFrom<ConfigRow> for ScreeningConfig {
    type Error = PersistenceError;

    fn try_from(row: ConfigRow) -> Result<Self, Self::Error> {
        Ok(ScreeningConfig {
            id: row.id,
            stable_id: row.stable_id,
            name: row.name,
            datasets: serde_json::from_str(&row.datasets)?,
        })
    }
}
