//! Reviewer Core - reviewer assignment engine for pull requests
//!
//! This crate selects reviewers for new pull requests, replaces reviewers on
//! request, and enforces the open/merged lifecycle that gates those changes.
//! Persistence is reached through the traits in [`repository`].

pub mod config;
pub mod domain;
pub mod error;
pub mod memory;
pub mod policy;
pub mod repository;
pub mod service;

pub use config::Config;
pub use domain::{
    NewPullRequest, PullRequest, PullRequestId, PullRequestShort, PullRequestStatus, Team,
    TeamMember, TeamName, User, UserId,
};
pub use error::{Error, Result};
pub use memory::InMemoryStore;
pub use policy::AssignmentPolicy;
pub use repository::{PullRequestStore, TeamDirectory, UserDirectory};
pub use service::{PullRequestService, Reassignment, ReviewAssignments, TeamService, UserService};
