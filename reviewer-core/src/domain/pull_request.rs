//! Pull requests and their review lifecycle

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PullRequestId, UserId};

/// Lifecycle status of a pull request
///
/// `Merged` is terminal: there is no transition out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    #[default]
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestStatus::Open => "OPEN",
            PullRequestStatus::Merged => "MERGED",
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PullRequestStatus::Merged)
    }

    /// Whether `next` is reachable from this status
    pub fn can_transition_to(&self, next: PullRequestStatus) -> bool {
        matches!(
            (self, next),
            (PullRequestStatus::Open, PullRequestStatus::Merged)
        )
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PullRequestStatus::Open),
            "MERGED" => Ok(PullRequestStatus::Merged),
            other => Err(format!("unknown pull request status: {}", other)),
        }
    }
}

/// A pull request about to be persisted
///
/// The store assigns `created_at` and the initial `OPEN` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub assigned_reviewers: Vec<UserId>,
}

impl NewPullRequest {
    /// Build the stored representation with the given creation time
    pub fn into_open(self, created_at: DateTime<Utc>) -> PullRequest {
        PullRequest {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: self.assigned_reviewers,
            created_at,
            merged_at: None,
        }
    }
}

/// A pull request with its assigned reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    /// Ordered, duplicate-free, never contains the author
    pub assigned_reviewers: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    /// Set on the first merge and never changed afterwards
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check whether `user_id` is currently assigned as a reviewer
    pub fn is_assigned(&self, user_id: &UserId) -> bool {
        self.assigned_reviewers.contains(user_id)
    }

    /// Mark as merged, keeping the first merge timestamp
    ///
    /// Merging an already merged pull request changes nothing.
    pub fn merge(&mut self, now: DateTime<Utc>) {
        if self.status.can_transition_to(PullRequestStatus::Merged) {
            self.status = PullRequestStatus::Merged;
            self.merged_at = Some(now);
        }
    }

    /// Swap `old` for `new` in place, keeping its slot
    ///
    /// Callers check [`is_assigned`](Self::is_assigned) first; an unassigned
    /// `old` leaves the reviewer list untouched.
    pub fn replace_reviewer(&mut self, old: &UserId, new: UserId) {
        if let Some(slot) = self.assigned_reviewers.iter_mut().find(|r| *r == old) {
            *slot = new;
        }
    }

    /// Summary view
    pub fn short(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Summary of a pull request, as listed for a reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
}
