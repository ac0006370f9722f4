//! Teams and their membership

use serde::{Deserialize, Serialize};

use super::{TeamName, User, UserId};

/// Member entry as listed on a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: UserId,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    /// Create a new active member
    pub fn new(user_id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Build the user record this member represents
    pub fn to_user(&self, team_name: &TeamName) -> User {
        User {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            team_name: team_name.clone(),
            is_active: self.is_active,
        }
    }
}

impl From<&User> for TeamMember {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            is_active: user.is_active,
        }
    }
}

/// A named group of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: TeamName,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Create an empty team
    pub fn new(team_name: impl Into<TeamName>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }

    /// User records for every member of this team
    pub fn users(&self) -> impl Iterator<Item = User> + '_ {
        self.members.iter().map(|m| m.to_user(&self.team_name))
    }
}
