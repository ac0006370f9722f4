//! Team registration

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{Team, TeamName};
use crate::repository::TeamDirectory;
use crate::{Error, Result};

pub struct TeamService {
    teams: Arc<dyn TeamDirectory>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamDirectory>) -> Self {
        Self { teams }
    }

    /// Register a team together with its members
    ///
    /// Fails with `InvalidInput` if a user is listed more than once.
    pub async fn create_team(&self, team: &Team) -> Result<Team> {
        let mut seen = HashSet::new();
        if let Some(dup) = team.members.iter().find(|m| !seen.insert(&m.user_id)) {
            return Err(Error::InvalidInput(format!(
                "user {} listed more than once in team {}",
                dup.user_id, team.team_name
            )));
        }

        let team = self.teams.create_team(team).await?;
        tracing::info!(
            team = %team.team_name,
            members = team.members.len(),
            "Team created"
        );
        Ok(team)
    }

    /// Fetch a team and its members
    pub async fn team(&self, team_name: &TeamName) -> Result<Team> {
        self.teams.team(team_name).await
    }
}
