//! Repository for user records

use async_trait::async_trait;
use reviewer_core::{TeamName, User, UserDirectory, UserId};
use sqlx::SqlitePool;

use crate::Result;

/// Row shape shared by every user query
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id.into(),
            username: row.username,
            team_name: row.team_name.into(),
            is_active: row.is_active,
        }
    }
}

/// Repository for managing users
#[derive(Clone)]
pub struct UsersRepo {
    pool: SqlitePool,
}

impl UsersRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_active_by_team(&self, team_name: &TeamName) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT user_id, username, team_name, is_active
             FROM users
             WHERE team_name = ?1 AND is_active = TRUE
             ORDER BY user_id",
        )
        .bind(team_name.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_is_active(&self, user_id: &UserId, is_active: bool) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE users SET is_active = ?1 WHERE user_id = ?2
             RETURNING user_id, username, team_name, is_active",
        )
        .bind(is_active)
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UserDirectory for UsersRepo {
    async fn get_user(&self, user_id: &UserId) -> reviewer_core::Result<User> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| reviewer_core::Error::user_not_found(user_id))
    }

    async fn active_team_members(&self, team_name: &TeamName) -> reviewer_core::Result<Vec<User>> {
        Ok(self.find_active_by_team(team_name).await?)
    }

    async fn set_is_active(&self, user_id: &UserId, is_active: bool) -> reviewer_core::Result<User> {
        let user = self
            .update_is_active(user_id, is_active)
            .await?
            .ok_or_else(|| reviewer_core::Error::user_not_found(user_id))?;

        tracing::debug!(user_id = %user_id, is_active, "Updated user activity");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use reviewer_core::{Error, Team, TeamDirectory, TeamMember};

    async fn setup_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        let team = Team::new("backend")
            .with_member(TeamMember::new("u1", "Alice"))
            .with_member(TeamMember::new("u2", "Bob"))
            .with_member(TeamMember::new("u3", "Carol").with_active(false));
        db.teams().create_team(&team).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_user() {
        let db = setup_db().await;
        let repo = db.users();

        let user = repo.get_user(&"u1".into()).await.unwrap();
        assert_eq!(user.username, "Alice");
        assert_eq!(user.team_name.as_str(), "backend");
        assert!(user.is_active);

        let err = repo.get_user(&"ghost".into()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_active_team_members() {
        let db = setup_db().await;
        let repo = db.users();

        let active = repo.active_team_members(&"backend".into()).await.unwrap();
        let ids: Vec<&str> = active.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);

        assert!(repo
            .active_team_members(&"unknown".into())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_set_is_active() {
        let db = setup_db().await;
        let repo = db.users();

        let user = repo.set_is_active(&"u3".into(), true).await.unwrap();
        assert!(user.is_active);
        assert_eq!(
            repo.active_team_members(&"backend".into())
                .await
                .unwrap()
                .len(),
            3
        );

        let err = repo.set_is_active(&"ghost".into(), false).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
