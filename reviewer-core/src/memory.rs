//! In-memory implementation of the directory and store traits
//!
//! All state sits behind one `RwLock`, so every operation observes and
//! mutates a consistent snapshot. Semantics match the SQLite backend.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    NewPullRequest, PullRequest, PullRequestId, PullRequestShort, Team, TeamMember, TeamName,
    User, UserId,
};
use crate::repository::{PullRequestStore, TeamDirectory, UserDirectory};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    teams: BTreeSet<TeamName>,
    users: BTreeMap<UserId, User>,
    pull_requests: HashMap<PullRequestId, PullRequest>,
}

/// Shared in-memory backend
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pull request exactly as given
    ///
    /// Lets tests set up states that the public operations cannot reach
    /// directly, such as a pull request with a hand-picked reviewer set.
    #[cfg(test)]
    pub(crate) async fn put_pull_request(&self, pull_request: PullRequest) {
        let mut state = self.state.write().await;
        state
            .pull_requests
            .insert(pull_request.pull_request_id.clone(), pull_request);
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn get_user(&self, user_id: &UserId) -> Result<User> {
        let state = self.state.read().await;
        state
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::user_not_found(user_id))
    }

    async fn active_team_members(&self, team_name: &TeamName) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| &u.team_name == team_name && u.is_active)
            .cloned()
            .collect())
    }

    async fn set_is_active(&self, user_id: &UserId, is_active: bool) -> Result<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::user_not_found(user_id))?;
        user.is_active = is_active;
        Ok(user.clone())
    }
}

#[async_trait]
impl TeamDirectory for InMemoryStore {
    async fn create_team(&self, team: &Team) -> Result<Team> {
        let mut state = self.state.write().await;
        if !state.teams.insert(team.team_name.clone()) {
            return Err(Error::TeamExists(team.team_name.clone()));
        }

        for user in team.users() {
            state.users.insert(user.user_id.clone(), user);
        }

        Ok(team.clone())
    }

    async fn team(&self, team_name: &TeamName) -> Result<Team> {
        let state = self.state.read().await;
        if !state.teams.contains(team_name) {
            return Err(Error::team_not_found(team_name));
        }

        let members = state
            .users
            .values()
            .filter(|u| &u.team_name == team_name)
            .map(TeamMember::from)
            .collect();

        Ok(Team {
            team_name: team_name.clone(),
            members,
        })
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create(&self, pull_request: NewPullRequest) -> Result<PullRequest> {
        let mut state = self.state.write().await;
        if state
            .pull_requests
            .contains_key(&pull_request.pull_request_id)
        {
            return Err(Error::PrExists(pull_request.pull_request_id));
        }

        let pull_request = pull_request.into_open(Utc::now());
        state
            .pull_requests
            .insert(pull_request.pull_request_id.clone(), pull_request.clone());
        Ok(pull_request)
    }

    async fn get(&self, pull_request_id: &PullRequestId) -> Result<PullRequest> {
        let state = self.state.read().await;
        state
            .pull_requests
            .get(pull_request_id)
            .cloned()
            .ok_or_else(|| Error::pull_request_not_found(pull_request_id))
    }

    async fn merge(&self, pull_request_id: &PullRequestId) -> Result<PullRequest> {
        let mut state = self.state.write().await;
        let pull_request = state
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| Error::pull_request_not_found(pull_request_id))?;
        pull_request.merge(Utc::now());
        Ok(pull_request.clone())
    }

    async fn reassign_reviewer(
        &self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<PullRequest> {
        if old == new {
            return Err(Error::NoCandidate);
        }

        let mut state = self.state.write().await;
        let pull_request = state
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| Error::pull_request_not_found(pull_request_id))?;

        if pull_request.is_merged() {
            return Err(Error::PrMerged(pull_request_id.clone()));
        }
        if !pull_request.is_assigned(old) {
            return Err(Error::NotAssigned {
                pull_request: pull_request_id.clone(),
                reviewer: old.clone(),
            });
        }
        if pull_request.is_assigned(new) || &pull_request.author_id == new {
            return Err(Error::NoCandidate);
        }
        pull_request.replace_reviewer(old, new.clone());

        Ok(pull_request.clone())
    }

    async fn list_by_reviewer(&self, user_id: &UserId) -> Result<Vec<PullRequestShort>> {
        let state = self.state.read().await;
        let mut assigned: Vec<&PullRequest> = state
            .pull_requests
            .values()
            .filter(|pr| pr.is_assigned(user_id))
            .collect();
        assigned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(assigned.into_iter().map(PullRequest::short).collect())
    }
}
