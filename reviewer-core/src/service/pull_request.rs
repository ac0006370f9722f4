//! Pull request lifecycle coordinator
//!
//! Orchestrates directory lookups and store mutations around the
//! [`AssignmentPolicy`]:
//! 1. Resolves the users involved and their team's active members
//! 2. Builds the exclusion set (author, current reviewers)
//! 3. Asks the policy for reviewers among the remaining candidates
//! 4. Commits the result through the store
//!
//! The coordinator never retries: domain errors are final and storage
//! errors are returned to the caller unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{NewPullRequest, PullRequest, PullRequestId, User, UserId};
use crate::policy::AssignmentPolicy;
use crate::repository::{PullRequestStore, UserDirectory};
use crate::{Error, Result};

/// Outcome of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    /// The pull request after the swap
    pub pull_request: PullRequest,
    /// The reviewer that replaced the old one
    pub replaced_by: UserId,
}

/// Creates, merges and reassigns reviewers on pull requests
pub struct PullRequestService {
    pull_requests: Arc<dyn PullRequestStore>,
    users: Arc<dyn UserDirectory>,
    policy: AssignmentPolicy,
}

impl PullRequestService {
    /// Create a new coordinator
    pub fn new(
        pull_requests: Arc<dyn PullRequestStore>,
        users: Arc<dyn UserDirectory>,
        policy: AssignmentPolicy,
    ) -> Self {
        Self {
            pull_requests,
            users,
            policy,
        }
    }

    /// Create a pull request and assign up to two reviewers from the author's team
    pub async fn create_pr(
        &self,
        pull_request_id: PullRequestId,
        pull_request_name: impl Into<String>,
        author_id: &UserId,
    ) -> Result<PullRequest> {
        let author = self.users.get_user(author_id).await?;
        let members = self.users.active_team_members(&author.team_name).await?;

        let excluded = HashSet::from([author_id]);
        let candidates = eligible(members, &excluded);
        let reviewers = self.policy.select_initial_reviewers(candidates);

        tracing::debug!(
            pr_id = %pull_request_id,
            author = %author_id,
            team = %author.team_name,
            reviewers = ?reviewers,
            "Selected initial reviewers"
        );

        // Uniqueness is left to the store so there is no check-then-insert race
        let pull_request = self
            .pull_requests
            .create(NewPullRequest {
                pull_request_id,
                pull_request_name: pull_request_name.into(),
                author_id: author_id.clone(),
                assigned_reviewers: reviewers,
            })
            .await?;

        tracing::info!(
            pr_id = %pull_request.pull_request_id,
            reviewers = pull_request.assigned_reviewers.len(),
            "Pull request created"
        );

        Ok(pull_request)
    }

    /// Merge a pull request
    ///
    /// Idempotent: merging twice returns the original merge timestamp.
    pub async fn merge_pr(&self, pull_request_id: &PullRequestId) -> Result<PullRequest> {
        let pull_request = self.pull_requests.merge(pull_request_id).await?;
        tracing::info!(pr_id = %pull_request_id, merged_at = ?pull_request.merged_at, "Pull request merged");
        Ok(pull_request)
    }

    /// Replace `old_reviewer_id` with another active member of their team
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &PullRequestId,
        old_reviewer_id: &UserId,
    ) -> Result<Reassignment> {
        let pull_request = self.pull_requests.get(pull_request_id).await?;

        if pull_request.is_merged() {
            return Err(Error::PrMerged(pull_request_id.clone()));
        }

        if !pull_request.is_assigned(old_reviewer_id) {
            return Err(Error::NotAssigned {
                pull_request: pull_request_id.clone(),
                reviewer: old_reviewer_id.clone(),
            });
        }

        let old_reviewer = self.users.get_user(old_reviewer_id).await?;
        let members = self
            .users
            .active_team_members(&old_reviewer.team_name)
            .await?;

        let excluded: HashSet<&UserId> = std::iter::once(&pull_request.author_id)
            .chain(pull_request.assigned_reviewers.iter())
            .collect();
        let candidates = eligible(members, &excluded);

        let new_reviewer_id = self.policy.select_replacement(&candidates)?;
        if &new_reviewer_id == old_reviewer_id {
            return Err(Error::NoCandidate);
        }

        tracing::debug!(
            pr_id = %pull_request_id,
            old = %old_reviewer_id,
            new = %new_reviewer_id,
            candidates = candidates.len(),
            "Selected replacement reviewer"
        );

        // The store re-checks the precondition; a concurrent swap surfaces here
        let pull_request = self
            .pull_requests
            .reassign_reviewer(pull_request_id, old_reviewer_id, &new_reviewer_id)
            .await?;

        tracing::info!(
            pr_id = %pull_request_id,
            old = %old_reviewer_id,
            new = %new_reviewer_id,
            "Reviewer reassigned"
        );

        Ok(Reassignment {
            pull_request,
            replaced_by: new_reviewer_id,
        })
    }
}

/// Ids of `members` not in `excluded`, deduplicated, in directory order
fn eligible(members: Vec<User>, excluded: &HashSet<&UserId>) -> Vec<UserId> {
    let mut seen = HashSet::new();
    members
        .into_iter()
        .filter(|m| m.is_active && !excluded.contains(&m.user_id))
        .map(|m| m.user_id)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
