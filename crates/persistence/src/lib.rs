//! # Sentinel Persistence
//!
//! SQLite persistence for the screening engine: schema, repositories and
//! the transaction scoping the engine builds its invariants on.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentinel_persistence::{Database, ScreeningRepo};
//!
//! let db = Database::new("sqlite:sentinel.db?mode=rwc").await?;
//!
//! let mut tx = db.pool().begin().await?;
//! ScreeningRepo::insert(&mut tx, &screening).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::{
    create_pool, init_database, run_migrations, CommentRepo, CommentRow, ConfigRow, MatchRepo,
    MatchRow, ScreeningConfigRepo, ScreeningRepo, ScreeningRow,
};

use sqlx::SqlitePool;

/// Database facade: a migrated SQLite pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database and bring its schema up to date
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g. "sqlite:sentinel.db?mode=rwc")
    pub async fn new(db_url: &str) -> PersistenceResult<Self> {
        let pool = init_database(db_url).await?;
        Ok(Self { pool })
    }

    /// An in-memory database (used in tests)
    pub async fn in_memory() -> PersistenceResult<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Get the SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
