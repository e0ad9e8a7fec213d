//! Error types for the database layer.

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A thread panicked while holding the connection.
    #[error("database lock poisoned")]
    LockPoisoned,

    /// The on-disk schema is newer than this binary understands.
    #[error("database schema version {found} is newer than supported version {supported}")]
    VersionTooNew { found: i64, supported: i64 },
}

impl DbError {
    pub fn status_code(&self) -> u16 {
        500
    }
}
