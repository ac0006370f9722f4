//! Repository for teams and their membership

use async_trait::async_trait;
use reviewer_core::{Team, TeamDirectory, TeamMember, TeamName, User};
use sqlx::SqlitePool;

use super::{is_unique_violation, users::UserRow};
use crate::{Error, Result};

/// Repository for managing teams
#[derive(Clone)]
pub struct TeamsRepo {
    pool: SqlitePool,
}

impl TeamsRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the team and upsert its members in one transaction
    async fn insert(&self, team: &Team) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO teams (team_name) VALUES (?1)")
            .bind(team.team_name.as_str())
            .execute(&mut *tx)
            .await;
        match inserted {
            Err(e) if is_unique_violation(&e) => {
                return Err(reviewer_core::Error::TeamExists(team.team_name.clone()).into())
            }
            other => {
                other?;
            }
        }

        // Members may move here from another team
        for user in team.users() {
            sqlx::query(
                "INSERT INTO users (user_id, username, team_name, is_active)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active",
            )
            .bind(user.user_id.as_str())
            .bind(&user.username)
            .bind(user.team_name.as_str())
            .bind(user.is_active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_name(&self, team_name: &TeamName) -> Result<Team> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT team_name FROM teams WHERE team_name = ?1")
                .bind(team_name.as_str())
                .fetch_optional(&self.pool)
                .await?;

        if exists.is_none() {
            return Err(Error::Domain(reviewer_core::Error::team_not_found(
                team_name,
            )));
        }

        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT user_id, username, team_name, is_active
             FROM users
             WHERE team_name = ?1
             ORDER BY user_id",
        )
        .bind(team_name.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(Team {
            team_name: team_name.clone(),
            members: rows
                .into_iter()
                .map(|row| TeamMember::from(&User::from(row)))
                .collect(),
        })
    }
}

#[async_trait]
impl TeamDirectory for TeamsRepo {
    async fn create_team(&self, team: &Team) -> reviewer_core::Result<Team> {
        self.insert(team).await?;
        tracing::debug!(team = %team.team_name, members = team.members.len(), "Inserted team");
        Ok(self.find_by_name(&team.team_name).await?)
    }

    async fn team(&self, team_name: &TeamName) -> reviewer_core::Result<Team> {
        Ok(self.find_by_name(team_name).await?)
    }
}
