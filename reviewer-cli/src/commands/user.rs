//! User commands

use clap::{Args, Subcommand};
use reviewer_core::{ReviewAssignments, User, UserId};

use super::App;

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Mark a user as active or inactive for review assignment
    SetActive {
        /// User id
        user_id: String,

        /// New active flag
        #[arg(action = clap::ArgAction::Set)]
        is_active: bool,
    },

    /// List pull requests a user is assigned to review
    Reviews {
        /// User id
        user_id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match &self.command {
            UserCommand::SetActive { user_id, is_active } => {
                let user = app
                    .users
                    .set_is_active(&UserId::from(user_id.as_str()), *is_active)
                    .await?;
                app.emit(&user, print_user)
            }
            UserCommand::Reviews { user_id } => {
                let assignments = app
                    .users
                    .review_assignments(&UserId::from(user_id.as_str()))
                    .await?;
                app.emit(&assignments, print_assignments)
            }
        }
    }
}

fn print_user(user: &User) {
    let status = if user.is_active { "active" } else { "inactive" };
    println!("{} ({}) team={} [{}]", user.user_id, user.username, user.team_name, status);
}

fn print_assignments(assignments: &ReviewAssignments) {
    if assignments.pull_requests.is_empty() {
        println!("No pull requests assigned to {}.", assignments.user_id);
        return;
    }

    println!("Reviews for {}:", assignments.user_id);
    for pr in &assignments.pull_requests {
        println!(
            "  {} [{}] {} (author: {})",
            pr.pull_request_id, pr.status, pr.pull_request_name, pr.author_id
        );
    }
}
