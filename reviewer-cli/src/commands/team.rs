//! Team commands

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use reviewer_core::{Team, TeamName};

use super::App;

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Register a team from a JSON file
    ///
    /// Format: {"team_name": "backend", "members": [{"user_id": "u1", "username": "Alice", "is_active": true}]}
    Add {
        /// Path to the team JSON file
        file: PathBuf,
    },

    /// Show a team and its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match &self.command {
            TeamCommand::Add { file } => {
                let contents = std::fs::read_to_string(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let team: Team = serde_json::from_str(&contents)
                    .with_context(|| format!("Invalid team definition in {}", file.display()))?;

                let team = app.teams.create_team(&team).await?;
                app.emit(&team, print_team)
            }
            TeamCommand::Get { name } => {
                let team = app.teams.team(&TeamName::from(name.as_str())).await?;
                app.emit(&team, print_team)
            }
        }
    }
}

fn print_team(team: &Team) {
    println!("Team: {}", team.team_name);
    for member in &team.members {
        let status = if member.is_active { "active" } else { "inactive" };
        println!("  {} ({}) [{}]", member.user_id, member.username, status);
    }
}
