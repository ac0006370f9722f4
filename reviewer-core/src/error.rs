//! Error types for reviewer assignment

use thiserror::Error;

use crate::domain::{PullRequestId, TeamName, UserId};

/// Result type alias for reviewer assignment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reviewer assignment operations
///
/// Every variant except [`Error::Storage`] is a deterministic business-rule
/// rejection: retrying the same request yields the same answer.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced user, team or pull request does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A pull request with this id already exists
    #[error("Pull request {0} already exists")]
    PrExists(PullRequestId),

    /// Reviewer changes are not allowed on a merged pull request
    #[error("Operation not allowed on merged pull request {0}")]
    PrMerged(PullRequestId),

    /// The reviewer is not assigned to the pull request
    #[error("Reviewer {reviewer} is not assigned to pull request {pull_request}")]
    NotAssigned {
        pull_request: PullRequestId,
        reviewer: UserId,
    },

    /// No active replacement candidate available in the team
    #[error("No active replacement candidate available in team")]
    NoCandidate,

    /// A team with this name already exists
    #[error("Team {0} already exists")]
    TeamExists(TeamName),

    /// Request is malformed, e.g. a team listing the same user twice
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Opaque storage or transport failure from a directory/store backend
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a missing user
    pub fn user_not_found(user_id: &UserId) -> Self {
        Error::NotFound(format!("user {}", user_id))
    }

    /// Shorthand for a missing team
    pub fn team_not_found(team_name: &TeamName) -> Self {
        Error::NotFound(format!("team {}", team_name))
    }

    /// Shorthand for a missing pull request
    pub fn pull_request_not_found(pull_request_id: &PullRequestId) -> Self {
        Error::NotFound(format!("pull request {}", pull_request_id))
    }

    /// Wrap a backend failure
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Storage(Box::new(err))
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NOT_FOUND",
            Error::PrExists(_) => "PR_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoCandidate => "NO_CANDIDATE",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Storage(_) | Error::Io(_) => "INTERNAL",
            Error::Config(_) => "CONFIG",
        }
    }

    /// Whether the caller may retry the request
    ///
    /// Only infrastructure failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_not_retryable() {
        let errors = [
            Error::NotFound("user u1".to_string()),
            Error::PrExists(PullRequestId::from("pr-1")),
            Error::PrMerged(PullRequestId::from("pr-1")),
            Error::NotAssigned {
                pull_request: PullRequestId::from("pr-1"),
                reviewer: UserId::from("u1"),
            },
            Error::NoCandidate,
            Error::TeamExists(TeamName::from("backend")),
            Error::InvalidInput("duplicate member u1".to_string()),
        ];

        for err in errors {
            assert!(!err.is_retryable(), "{} should not be retryable", err);
        }
    }

    #[test]
    fn test_storage_error_is_retryable() {
        let err = Error::storage(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ));
        assert!(err.is_retryable());
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NoCandidate.code(), "NO_CANDIDATE");
        assert_eq!(
            Error::PrMerged(PullRequestId::from("pr-1")).code(),
            "PR_MERGED"
        );
        assert_eq!(
            Error::user_not_found(&UserId::from("u1")).to_string(),
            "Not found: user u1"
        );
    }
}
