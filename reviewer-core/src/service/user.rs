//! User activation and review queues

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{PullRequestShort, User, UserId};
use crate::repository::{PullRequestStore, UserDirectory};
use crate::Result;

/// Pull requests a user is currently assigned to review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAssignments {
    pub user_id: UserId,
    pub pull_requests: Vec<PullRequestShort>,
}

pub struct UserService {
    users: Arc<dyn UserDirectory>,
    pull_requests: Arc<dyn PullRequestStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, pull_requests: Arc<dyn PullRequestStore>) -> Self {
        Self {
            users,
            pull_requests,
        }
    }

    /// Toggle whether a user is eligible as a reviewer
    ///
    /// Existing assignments are left as they are.
    pub async fn set_is_active(&self, user_id: &UserId, is_active: bool) -> Result<User> {
        let user = self.users.set_is_active(user_id, is_active).await?;
        tracing::info!(user_id = %user_id, is_active, "User activity updated");
        Ok(user)
    }

    /// List the pull requests assigned to a user for review
    pub async fn review_assignments(&self, user_id: &UserId) -> Result<ReviewAssignments> {
        self.users.get_user(user_id).await?;
        let pull_requests = self.pull_requests.list_by_reviewer(user_id).await?;

        Ok(ReviewAssignments {
            user_id: user_id.clone(),
            pull_requests,
        })
    }
}
