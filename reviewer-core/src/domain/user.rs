//! User records

use serde::{Deserialize, Serialize};

use super::{TeamName, UserId};

/// A team member who can author or review pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub user_id: UserId,

    /// Display name
    pub username: String,

    /// Team the user belongs to
    pub team_name: TeamName,

    /// Only active users are eligible as reviewers
    pub is_active: bool,
}
