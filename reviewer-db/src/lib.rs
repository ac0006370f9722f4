//! Database layer for the reviewer assignment engine
//!
//! Provides SQLite-backed implementations of the user directory, team
//! directory and pull request store.

pub mod error;
pub mod repos;

use std::str::FromStr;

use reviewer_core::config::{DatabaseConfig, RetryConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

pub use error::{Error, Result};
pub use repos::{PullRequestsRepo, TeamsRepo, UsersRepo};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration and run migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .foreign_keys(true)
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Connect, retrying transient failures with exponential backoff
    ///
    /// Migration and configuration errors are returned immediately.
    pub async fn connect_with_retry(config: &DatabaseConfig, retry: &RetryConfig) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::connect(config).await {
                Ok(db) => return Ok(db),
                Err(e) if e.is_transient() && attempt < retry.attempts => {
                    let delay = retry.backoff_for(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = retry.attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Create an in-memory database for testing
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Database migrations applied");
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that the database answers queries
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get the users repository
    pub fn users(&self) -> UsersRepo {
        UsersRepo::new(self.pool.clone())
    }

    /// Get the teams repository
    pub fn teams(&self) -> TeamsRepo {
        TeamsRepo::new(self.pool.clone())
    }

    /// Get the pull requests repository
    pub fn pull_requests(&self) -> PullRequestsRepo {
        PullRequestsRepo::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
