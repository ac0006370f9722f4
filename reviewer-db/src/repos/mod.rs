//! Repository modules for database operations

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestsRepo;
pub use teams::TeamsRepo;
pub use users::UsersRepo;

/// Whether the statement failed on a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
