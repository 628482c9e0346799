//! Repository implementations for SQLite
//!
//! All mutating methods take a `&mut SqliteConnection` so that a caller
//! can compose several of them inside one transaction; reads go through
//! the same signature and run on a pooled connection. SQL lives here and
//! nowhere else.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::{CommentRow, ConfigRow, MatchRow, ScreeningRow};
use chrono::{DateTime, Utc};
use sentinel_core::{
    MatchComment, Screening, ScreeningConfig, ScreeningMatch, ScreeningStatus,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;

// ============================================================================
// Screening Repository
// ============================================================================

/// Repository for the `screenings` table
pub struct ScreeningRepo;

impl ScreeningRepo {
    /// Insert a new screening row
    pub async fn insert(
        conn: &mut SqliteConnection,
        screening: &Screening,
    ) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO screenings (
                id, decision_id, organization_id, config_id, status,
                search_input, initial_query, counterparty_id, match_threshold,
                match_limit, is_manual, requested_by, is_partial, is_archived,
                initial_has_matches, error_codes, number_of_matches,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&screening.id)
        .bind(&screening.decision_id)
        .bind(&screening.organization_id)
        .bind(&screening.config_id)
        .bind(screening.status.as_str())
        .bind(serde_json::to_string(&screening.search_input)?)
        .bind(serde_json::to_string(&screening.initial_query)?)
        .bind(&screening.counterparty_id)
        .bind(screening.match_threshold)
        .bind(screening.match_limit as i64)
        .bind(screening.is_manual)
        .bind(&screening.requested_by)
        .bind(screening.is_partial)
        .bind(screening.is_archived)
        .bind(screening.initial_has_matches)
        .bind(serde_json::to_string(&screening.error_codes)?)
        .bind(screening.number_of_matches as i64)
        .bind(screening.created_at)
        .bind(screening.updated_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Load a screening by id
    pub async fn get(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<Screening> {
        let row = sqlx::query_as::<_, ScreeningRow>("SELECT * FROM screenings WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Screening", id))?;
        Screening::try_from(row)
    }

    /// Archive every live screening in the given scope.
    ///
    /// Decision-triggered screenings are scoped per (org, counterparty,
    /// decision); manual screenings per (org, counterparty) among the
    /// manual ones. Returns the number of screenings archived.
    pub async fn archive_prior(
        conn: &mut SqliteConnection,
        organization_id: &str,
        counterparty_id: &str,
        decision_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> PersistenceResult<u64> {
        let result = match decision_id {
            Some(decision_id) => {
                sqlx::query(
                    "UPDATE screenings SET is_archived = 1, updated_at = ?
                     WHERE organization_id = ? AND counterparty_id = ?
                       AND decision_id = ? AND is_archived = 0",
                )
                .bind(now)
                .bind(organization_id)
                .bind(counterparty_id)
                .bind(decision_id)
                .execute(&mut *conn)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE screenings SET is_archived = 1, updated_at = ?
                     WHERE organization_id = ? AND counterparty_id = ?
                       AND decision_id IS NULL AND is_archived = 0",
                )
                .bind(now)
                .bind(organization_id)
                .bind(counterparty_id)
                .execute(&mut *conn)
                .await?
            }
        };
        Ok(result.rows_affected())
    }

    /// Persist a recomputed aggregate status
    pub async fn update_status(
        conn: &mut SqliteConnection,
        id: &str,
        status: ScreeningStatus,
        updated_at: DateTime<Utc>,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE screenings SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Screening", id));
        }
        Ok(())
    }

    /// List screenings attached to a decision, newest first
    pub async fn list_by_decision(
        conn: &mut SqliteConnection,
        decision_id: &str,
        include_archived: bool,
    ) -> PersistenceResult<Vec<Screening>> {
        let sql = if include_archived {
            "SELECT * FROM screenings WHERE decision_id = ?
             ORDER BY created_at DESC, id"
        } else {
            "SELECT * FROM screenings WHERE decision_id = ? AND is_archived = 0
             ORDER BY created_at DESC, id"
        };
        let rows = sqlx::query_as::<_, ScreeningRow>(sql)
            .bind(decision_id)
            .fetch_all(&mut *conn)
            .await?;
        rows.into_iter().map(Screening::try_from).collect()
    }
}

// ============================================================================
// Match Repository
// ============================================================================

/// Repository for the `screening_matches` table
pub struct MatchRepo;

impl MatchRepo {
    /// Insert a batch of matches for a freshly created screening
    pub async fn insert_batch(
        conn: &mut SqliteConnection,
        matches: &[ScreeningMatch],
    ) -> PersistenceResult<()> {
        for m in matches {
            sqlx::query(
                "INSERT INTO screening_matches (
                    id, screening_id, open_sanction_entity_id, status,
                    query_ids, counterparty_id, score, payload, enriched,
                    reviewed_by, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&m.id)
            .bind(&m.screening_id)
            .bind(&m.open_sanction_entity_id)
            .bind(m.status.as_str())
            .bind(serde_json::to_string(&m.query_ids)?)
            .bind(&m.counterparty_id)
            .bind(m.score)
            .bind(serde_json::to_string(&m.payload)?)
            .bind(m.enriched)
            .bind(&m.reviewed_by)
            .bind(m.created_at)
            .bind(m.updated_at)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Load a match by id
    pub async fn get(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<ScreeningMatch> {
        let row = sqlx::query_as::<_, MatchRow>("SELECT * FROM screening_matches WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("ScreeningMatch", id))?;
        ScreeningMatch::try_from(row)
    }

    /// List a screening's matches in review order: matches still awaiting
    /// review first, then resolved ones, score descending within a tier.
    pub async fn list_for_screening(
        conn: &mut SqliteConnection,
        screening_id: &str,
    ) -> PersistenceResult<Vec<ScreeningMatch>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT * FROM screening_matches WHERE screening_id = ?
             ORDER BY CASE WHEN status IN ('pending', 'unknown') THEN 0 ELSE 1 END,
                      score DESC, id",
        )
        .bind(screening_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(ScreeningMatch::try_from).collect()
    }

    /// Persist the review fields of an already-inserted match
    pub async fn update_review(
        conn: &mut SqliteConnection,
        m: &ScreeningMatch,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE screening_matches SET status = ?, reviewed_by = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(m.status.as_str())
        .bind(&m.reviewed_by)
        .bind(m.updated_at)
        .bind(&m.id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("ScreeningMatch", &m.id));
        }
        Ok(())
    }
}

// ============================================================================
// Comment Repository
// ============================================================================

/// Repository for the `screening_match_comments` table.
///
/// Append-only: there are no update or delete methods.
pub struct CommentRepo;

impl CommentRepo {
    /// Append a comment to a match
    pub async fn insert(
        conn: &mut SqliteConnection,
        comment: &MatchComment,
    ) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO screening_match_comments (id, match_id, commented_by, comment, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.match_id)
        .bind(&comment.commented_by)
        .bind(&comment.comment)
        .bind(comment.created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// List one match's comments, oldest first
    pub async fn list_for_match(
        conn: &mut SqliteConnection,
        match_id: &str,
    ) -> PersistenceResult<Vec<MatchComment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT * FROM screening_match_comments WHERE match_id = ?
             ORDER BY created_at ASC, id",
        )
        .bind(match_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(MatchComment::from).collect())
    }

    /// Batch-load the comments of several matches, oldest first.
    ///
    /// Callers group the result by `match_id`; within a match the order
    /// reconstructs the review narrative.
    pub async fn list_for_matches(
        conn: &mut SqliteConnection,
        match_ids: &[String],
    ) -> PersistenceResult<Vec<MatchComment>> {
        if match_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM screening_match_comments WHERE match_id IN (");
        let mut separated = builder.separated(", ");
        for id in match_ids {
            separated.push_bind(id);
        }
        builder.push(") ORDER BY created_at ASC, id");

        let rows: Vec<CommentRow> = builder.build_query_as().fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(MatchComment::from).collect())
    }
}

// ============================================================================
// Screening Config Repository
// ============================================================================

/// Repository for the `screening_configs` table (read-mostly reference
/// data, seeded by the host application)
pub struct ScreeningConfigRepo;

impl ScreeningConfigRepo {
    pub async fn insert(
        conn: &mut SqliteConnection,
        config: &ScreeningConfig,
    ) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO screening_configs (id, stable_id, name, datasets) VALUES (?, ?, ?, ?)",
        )
        .bind(&config.id)
        .bind(&config.stable_id)
        .bind(&config.name)
        .bind(serde_json::to_string(&config.datasets)?)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn get(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<ScreeningConfig> {
        let row = sqlx::query_as::<_, ConfigRow>("SELECT * FROM screening_configs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("ScreeningConfig", id))?;
        ScreeningConfig::try_from(row)
    }
}

// ============================================================================
// Pool & migrations
// ============================================================================

/// Create a SQLite connection pool.
///
/// In-memory databases live per connection, so those pools are pinned to
/// a single connection that never expires.
pub async fn create_pool(database_url: &str) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePool::connect_with(options).await?
    };
    Ok(pool)
}

/// Run embedded migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Create a pool and bring the schema up to date
pub async fn init_database(database_url: &str) -> PersistenceResult<SqlitePool> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
