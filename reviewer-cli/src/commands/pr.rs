//! Pull request commands

use clap::{Args, Subcommand};
use reviewer_core::{PullRequest, PullRequestId, Reassignment, UserId};

use super::{format_reviewers, App};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Create a pull request and assign reviewers from the author's team
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        name: String,

        /// Author user id
        author: String,
    },

    /// Merge a pull request (idempotent)
    Merge {
        /// Pull request id
        id: String,
    },

    /// Replace a reviewer with another active member of their team
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match &self.command {
            PrCommand::Create { id, name, author } => {
                let pr = app
                    .pull_requests
                    .create_pr(
                        PullRequestId::from(id.as_str()),
                        name.as_str(),
                        &UserId::from(author.as_str()),
                    )
                    .await?;
                app.emit(&pr, print_pull_request)
            }
            PrCommand::Merge { id } => {
                let pr = app
                    .pull_requests
                    .merge_pr(&PullRequestId::from(id.as_str()))
                    .await?;
                app.emit(&pr, print_pull_request)
            }
            PrCommand::Reassign { id, old_reviewer } => {
                let reassignment = app
                    .pull_requests
                    .reassign_reviewer(
                        &PullRequestId::from(id.as_str()),
                        &UserId::from(old_reviewer.as_str()),
                    )
                    .await?;
                app.emit(&reassignment, |r: &Reassignment| {
                    println!("Replaced {} with {}", old_reviewer, r.replaced_by);
                    print_pull_request(&r.pull_request);
                })
            }
        }
    }
}

fn print_pull_request(pr: &PullRequest) {
    println!("Pull request {} [{}]", pr.pull_request_id, pr.status);
    println!("  Title: {}", pr.pull_request_name);
    println!("  Author: {}", pr.author_id);
    println!("  Reviewers: {}", format_reviewers(&pr.assigned_reviewers));
    println!("  Created: {}", pr.created_at.to_rfc3339());
    if let Some(merged_at) = pr.merged_at {
        println!("  Merged: {}", merged_at.to_rfc3339());
    }
}
