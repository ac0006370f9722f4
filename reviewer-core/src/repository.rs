//! Capability interfaces consumed by the assignment engine
//!
//! Backends implement these traits; the services only ever talk to them
//! through `Arc<dyn ...>`. Implementations must map missing rows and
//! uniqueness violations to the matching [`Error`](crate::Error) kinds and
//! report everything else as [`Error::Storage`](crate::Error::Storage).

use async_trait::async_trait;

use crate::domain::{
    NewPullRequest, PullRequest, PullRequestId, PullRequestShort, Team, TeamName, User, UserId,
};
use crate::Result;

/// Lookup and activation of users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user, failing with `NotFound` if absent
    async fn get_user(&self, user_id: &UserId) -> Result<User>;

    /// List the active members of a team
    ///
    /// An unknown team yields an empty list.
    async fn active_team_members(&self, team_name: &TeamName) -> Result<Vec<User>>;

    /// Toggle a user's active flag, failing with `NotFound` if absent
    async fn set_is_active(&self, user_id: &UserId, is_active: bool) -> Result<User>;
}

/// Team registration and lookup
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Register a team and upsert its members as users
    ///
    /// Fails with `TeamExists` if the name is taken.
    async fn create_team(&self, team: &Team) -> Result<Team>;

    /// Fetch a team with its current members, failing with `NotFound`
    async fn team(&self, team_name: &TeamName) -> Result<Team>;
}

/// Persistence of pull requests and their reviewer sets
///
/// Every method is atomic per pull request.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert a new `OPEN` pull request
    ///
    /// Uniqueness is enforced here, failing with `PrExists`.
    async fn create(&self, pull_request: NewPullRequest) -> Result<PullRequest>;

    /// Fetch a pull request, failing with `NotFound`
    async fn get(&self, pull_request_id: &PullRequestId) -> Result<PullRequest>;

    /// Mark a pull request as merged
    ///
    /// Idempotent: repeated calls return the original `merged_at` and leave
    /// the reviewer set untouched.
    async fn merge(&self, pull_request_id: &PullRequestId) -> Result<PullRequest>;

    /// Replace `old` with `new` in the reviewer set if `old` is still assigned
    ///
    /// The precondition is checked at commit time: fails with `NotFound`,
    /// `PrMerged` or `NotAssigned` if the state changed since it was read.
    async fn reassign_reviewer(
        &self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<PullRequest>;

    /// Summaries of the pull requests a user is reviewing, newest first
    async fn list_by_reviewer(&self, user_id: &UserId) -> Result<Vec<PullRequestShort>>;
}
