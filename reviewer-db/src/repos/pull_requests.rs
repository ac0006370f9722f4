//! Repository for pull requests and their reviewer assignments
//!
//! Reviewer sets live in `pull_request_reviewers`, one row per reviewer with
//! a `position` column preserving assignment order. Every mutation runs in
//! a single transaction, and reassignment is a conditional update so its
//! precondition is checked at write time rather than trusted from an
//! earlier read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reviewer_core::{
    NewPullRequest, PullRequest, PullRequestId, PullRequestShort, PullRequestStatus,
    PullRequestStore, UserId,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::is_unique_violation;
use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct PullRequestShortRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
}

fn parse_status(status: &str) -> Result<PullRequestStatus> {
    status.parse().map_err(Error::InvalidData)
}

impl TryFrom<PullRequestShortRow> for PullRequestShort {
    type Error = Error;

    fn try_from(row: PullRequestShortRow) -> Result<Self> {
        Ok(PullRequestShort {
            status: parse_status(&row.status)?,
            pull_request_id: row.pull_request_id.into(),
            pull_request_name: row.pull_request_name,
            author_id: row.author_id.into(),
        })
    }
}

/// Repository for managing pull requests
#[derive(Clone)]
pub struct PullRequestsRepo {
    pool: SqlitePool,
}

impl PullRequestsRepo {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a pull request with its reviewers using the given connection
    async fn fetch(
        conn: &mut SqliteConnection,
        pull_request_id: &PullRequestId,
    ) -> Result<Option<PullRequest>> {
        let row: Option<PullRequestRow> = sqlx::query_as(
            "SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
             FROM pull_requests
             WHERE pull_request_id = ?1",
        )
        .bind(pull_request_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM pull_request_reviewers
             WHERE pull_request_id = ?1
             ORDER BY position",
        )
        .bind(pull_request_id.as_str())
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(PullRequest {
            status: parse_status(&row.status)?,
            pull_request_id: row.pull_request_id.into(),
            pull_request_name: row.pull_request_name,
            author_id: row.author_id.into(),
            assigned_reviewers: reviewers.into_iter().map(UserId::from).collect(),
            created_at: row.created_at,
            merged_at: row.merged_at,
        }))
    }

    async fn fetch_existing(
        conn: &mut SqliteConnection,
        pull_request_id: &PullRequestId,
    ) -> Result<PullRequest> {
        Self::fetch(conn, pull_request_id).await?.ok_or_else(|| {
            Error::Domain(reviewer_core::Error::pull_request_not_found(
                pull_request_id,
            ))
        })
    }

    async fn insert(&self, pull_request: NewPullRequest) -> Result<PullRequest> {
        let mut tx = self.pool.begin().await?;
        let created_at = Utc::now();

        let inserted = sqlx::query(
            "INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(pull_request.pull_request_id.as_str())
        .bind(&pull_request.pull_request_name)
        .bind(pull_request.author_id.as_str())
        .bind(PullRequestStatus::Open.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Err(e) if is_unique_violation(&e) => {
                return Err(reviewer_core::Error::PrExists(pull_request.pull_request_id).into());
            }
            other => {
                other?;
            }
        }

        for (position, reviewer) in pull_request.assigned_reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pull_request_reviewers (pull_request_id, user_id, position)
                 VALUES (?1, ?2, ?3)",
            )
            .bind(pull_request.pull_request_id.as_str())
            .bind(reviewer.as_str())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(pull_request.into_open(created_at))
    }

    async fn find_by_id(&self, pull_request_id: &PullRequestId) -> Result<PullRequest> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_existing(&mut conn, pull_request_id).await
    }

    async fn mark_merged(&self, pull_request_id: &PullRequestId) -> Result<PullRequest> {
        let mut tx = self.pool.begin().await?;

        // COALESCE keeps the first merge timestamp
        let result = sqlx::query(
            "UPDATE pull_requests
             SET status = 'MERGED', merged_at = COALESCE(merged_at, ?1)
             WHERE pull_request_id = ?2",
        )
        .bind(Utc::now())
        .bind(pull_request_id.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(reviewer_core::Error::pull_request_not_found(pull_request_id).into());
        }

        let pull_request = Self::fetch_existing(&mut tx, pull_request_id).await?;
        tx.commit().await?;
        Ok(pull_request)
    }

    async fn swap_reviewer(
        &self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> Result<PullRequest> {
        if old == new {
            return Err(reviewer_core::Error::NoCandidate.into());
        }

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE pull_request_reviewers
             SET user_id = ?1
             WHERE pull_request_id = ?2
               AND user_id = ?3
               AND EXISTS (
                   SELECT 1 FROM pull_requests
                   WHERE pull_request_id = ?2 AND status = 'OPEN' AND author_id <> ?1
               )",
        )
        .bind(new.as_str())
        .bind(pull_request_id.as_str())
        .bind(old.as_str())
        .execute(&mut *tx)
        .await;

        let updated = match updated {
            // `new` is already on the reviewer list
            Err(e) if is_unique_violation(&e) => {
                return Err(reviewer_core::Error::NoCandidate.into());
            }
            other => other?,
        };

        if updated.rows_affected() == 0 {
            return Err(Self::explain_rejected_swap(&mut tx, pull_request_id, old)
                .await?
                .into());
        }

        let pull_request = Self::fetch_existing(&mut tx, pull_request_id).await?;
        tx.commit().await?;
        Ok(pull_request)
    }

    /// Work out why a conditional swap touched no rows
    async fn explain_rejected_swap(
        conn: &mut SqliteConnection,
        pull_request_id: &PullRequestId,
        old: &UserId,
    ) -> Result<reviewer_core::Error> {
        let current = Self::fetch(conn, pull_request_id).await?;

        Ok(match current {
            None => reviewer_core::Error::pull_request_not_found(pull_request_id),
            Some(pr) if pr.is_merged() => reviewer_core::Error::PrMerged(pull_request_id.clone()),
            Some(pr) if !pr.is_assigned(old) => reviewer_core::Error::NotAssigned {
                pull_request: pull_request_id.clone(),
                reviewer: old.clone(),
            },
            // Only remaining condition: the replacement is the author
            Some(_) => reviewer_core::Error::NoCandidate,
        })
    }

    async fn find_by_reviewer(&self, user_id: &UserId) -> Result<Vec<PullRequestShort>> {
        let rows: Vec<PullRequestShortRow> = sqlx::query_as(
            "SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
             FROM pull_requests pr
             JOIN pull_request_reviewers prr ON pr.pull_request_id = prr.pull_request_id
             WHERE prr.user_id = ?1
             ORDER BY pr.created_at DESC, pr.pull_request_id",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PullRequestShort::try_from).collect()
    }
}

#[async_trait]
impl PullRequestStore for PullRequestsRepo {
    async fn create(&self, pull_request: NewPullRequest) -> reviewer_core::Result<PullRequest> {
        let pull_request = self.insert(pull_request).await?;
        tracing::debug!(pr_id = %pull_request.pull_request_id, "Inserted pull request");
        Ok(pull_request)
    }

    async fn get(&self, pull_request_id: &PullRequestId) -> reviewer_core::Result<PullRequest> {
        Ok(self.find_by_id(pull_request_id).await?)
    }

    async fn merge(&self, pull_request_id: &PullRequestId) -> reviewer_core::Result<PullRequest> {
        Ok(self.mark_merged(pull_request_id).await?)
    }

    async fn reassign_reviewer(
        &self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> reviewer_core::Result<PullRequest> {
        Ok(self.swap_reviewer(pull_request_id, old, new).await?)
    }

    async fn list_by_reviewer(
        &self,
        user_id: &UserId,
    ) -> reviewer_core::Result<Vec<PullRequestShort>> {
        Ok(self.find_by_reviewer(user_id).await?)
    }
}
