//! CLI command implementations

pub mod pr;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use std::sync::Arc;

use reviewer_core::{AssignmentPolicy, Config, PullRequestService, TeamService, UserService};
use reviewer_db::Database;
use serde::Serialize;

/// Services wired to the database, shared by every command
pub struct App {
    pub teams: TeamService,
    pub users: UserService,
    pub pull_requests: PullRequestService,
    json: bool,
}

impl App {
    /// Wire services to an open database
    pub fn new(db: &Database, config: &Config, json: bool) -> Self {
        let users = Arc::new(db.users());
        let pull_requests = Arc::new(db.pull_requests());

        Self {
            teams: TeamService::new(Arc::new(db.teams())),
            users: UserService::new(users.clone(), pull_requests.clone()),
            pull_requests: PullRequestService::new(
                pull_requests,
                users,
                AssignmentPolicy::from_config(&config.assignment),
            ),
            json,
        }
    }

    /// Print `value` as JSON in `--json` mode, otherwise run `human`
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Render a reviewer list for humans
pub(crate) fn format_reviewers<T: std::fmt::Display>(reviewers: &[T]) -> String {
    if reviewers.is_empty() {
        "(none)".to_string()
    } else {
        reviewers
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
