//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be mapped to a domain type
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Business-rule rejection detected inside the database layer
    #[error(transparent)]
    Domain(#[from] reviewer_core::Error),
}

impl Error {
    /// Whether opening the database again might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Sqlx(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ) || is_busy(e),
            Error::Io(_) => true,
            _ => false,
        }
    }
}

/// SQLITE_BUSY / SQLITE_LOCKED, including their extended codes
fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
        _ => false,
    }
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for reviewer_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Domain(domain) => domain,
            other => reviewer_core::Error::storage(other),
        }
    }
}
