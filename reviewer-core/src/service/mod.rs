//! Services exposed to callers (CLI, HTTP, ...)

pub mod pull_request;
pub mod team;
pub mod user;

pub use pull_request::{PullRequestService, Reassignment};
pub use team::TeamService;
pub use user::{ReviewAssignments, UserService};
