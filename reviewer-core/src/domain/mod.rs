//! Domain types for teams, users and pull requests

pub mod pull_request;
pub mod team;
pub mod user;

pub use pull_request::{NewPullRequest, PullRequest, PullRequestShort, PullRequestStatus};
pub use team::{Team, TeamMember};
pub use user::User;

/// Defines a string-backed identifier newtype
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Unique identifier of a user
    UserId
);

string_id!(
    /// Unique name of a team
    TeamName
);

string_id!(
    /// Unique identifier of a pull request
    PullRequestId
);
