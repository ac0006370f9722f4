//! Configuration management for the reviewer service
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVIEWER_*)
//! 3. Config file (~/.config/reviewer/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Database-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reviewer")
            .join("reviewer.db");

        Self {
            path,
            max_connections: 5,
        }
    }
}

/// Retry policy for opening the database
///
/// Applies to transport failures only, never to domain operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    pub attempts: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,

    /// Upper bound on the delay between retries
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (zero-based), doubling each time
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Reviewer selection configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Fixed generator seed; entropy-seeded when unset
    pub seed: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    pub assignment: AssignmentConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/reviewer/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reviewer").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVIEWER_DATABASE_PATH: Path to the SQLite database
    /// - REVIEWER_SEED: Fixed seed for reviewer selection
    /// - REVIEWER_CONNECT_RETRIES: Retry attempts when opening the database
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(path) = std::env::var("REVIEWER_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(seed) = std::env::var("REVIEWER_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| Error::Config(format!("Invalid REVIEWER_SEED '{}': {}", seed, e)))?;
            self.assignment.seed = Some(seed);
        }

        if let Ok(attempts) = std::env::var("REVIEWER_CONNECT_RETRIES") {
            self.retry.attempts = attempts.parse().map_err(|e| {
                Error::Config(format!(
                    "Invalid REVIEWER_CONNECT_RETRIES '{}': {}",
                    attempts, e
                ))
            })?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, database_path: Option<PathBuf>, seed: Option<u64>) -> Self {
        if let Some(path) = database_path {
            self.database.path = path;
        }

        if let Some(seed) = seed {
            self.assignment.seed = Some(seed);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(database_path: Option<PathBuf>, seed: Option<u64>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(database_path, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.path.ends_with("reviewer/reviewer.db"));
        assert_eq!(config.retry.attempts, 3);
        assert!(config.assignment.seed.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let config =
            Config::default().with_cli_overrides(Some(PathBuf::from("/tmp/review.db")), Some(42));

        assert_eq!(config.database.path, PathBuf::from("/tmp/review.db"));
        assert_eq!(config.assignment.seed, Some(42));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[database]
path = "/var/lib/reviewer/reviewer.db"
max_connections = 10

[retry]
attempts = 5
initial_backoff = "100ms"
max_backoff = "2s"

[assignment]
seed = 7
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/reviewer/reviewer.db")
        );
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(100));
        assert_eq!(config.retry.max_backoff, Duration::from_secs(2));
        assert_eq!(config.assignment.seed, Some(7));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[retry]
attempts = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // everything else should use defaults
        assert_eq!(config.retry.attempts, 1);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(200));
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nmax_connections = 2").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.database.max_connections, 2);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database\nmax_connections = ").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_backoff_doubles_up_to_max() {
        let retry = RetryConfig {
            attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        };

        assert_eq!(retry.backoff_for(0), Duration::from_millis(100));
        assert_eq!(retry.backoff_for(1), Duration::from_millis(200));
        assert_eq!(retry.backoff_for(2), Duration::from_millis(400));
        assert_eq!(retry.backoff_for(3), Duration::from_millis(500));
        assert_eq!(retry.backoff_for(40), Duration::from_millis(500));
    }
}
