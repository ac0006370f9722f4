//! End-to-end reviewer assignment against a SQLite database

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reviewer_core::config::DatabaseConfig;
use reviewer_core::{
    AssignmentPolicy, Error, NewPullRequest, PullRequest, PullRequestId, PullRequestService,
    PullRequestShort, PullRequestStatus, PullRequestStore, Team, TeamMember, TeamService, UserId,
    UserService,
};
use reviewer_db::{Database, PullRequestsRepo};
use tempfile::TempDir;

struct Services {
    teams: TeamService,
    users: UserService,
    pull_requests: Arc<PullRequestService>,
}

fn services(db: &Database, seed: u64) -> Services {
    let users = Arc::new(db.users());
    let pull_requests = Arc::new(db.pull_requests());

    Services {
        teams: TeamService::new(Arc::new(db.teams())),
        users: UserService::new(users.clone(), pull_requests.clone()),
        pull_requests: Arc::new(PullRequestService::new(
            pull_requests,
            users,
            AssignmentPolicy::seeded(seed),
        )),
    }
}

/// backend = {author, r1, r2 active; r3 inactive}
fn backend_team() -> Team {
    Team::new("backend")
        .with_member(TeamMember::new("author", "Author"))
        .with_member(TeamMember::new("r1", "Reviewer 1"))
        .with_member(TeamMember::new("r2", "Reviewer 2"))
        .with_member(TeamMember::new("r3", "Reviewer 3").with_active(false))
}

#[tokio::test]
async fn scenario_a_create_picks_two_active_teammates() {
    let db = Database::in_memory().await.unwrap();
    let s = services(&db, 11);
    s.teams.create_team(&backend_team()).await.unwrap();

    let pr = s
        .pull_requests
        .create_pr("pr-1".into(), "T", &"author".into())
        .await
        .unwrap();

    let mut reviewers = pr.assigned_reviewers.clone();
    reviewers.sort();
    assert_eq!(reviewers, vec![UserId::from("r1"), UserId::from("r2")]);
    assert_eq!(pr.status, PullRequestStatus::Open);
}

#[tokio::test]
async fn scenario_b_reassign_to_remaining_teammate() {
    let db = Database::in_memory().await.unwrap();
    let s = services(&db, 3);
    let team = Team::new("backend")
        .with_member(TeamMember::new("author", "Author"))
        .with_member(TeamMember::new("r1", "Reviewer 1"))
        .with_member(TeamMember::new("r2", "Reviewer 2").with_active(false));
    s.teams.create_team(&team).await.unwrap();

    // only r1 is eligible at creation time
    let pr = s
        .pull_requests
        .create_pr("pr-1".into(), "T", &"author".into())
        .await
        .unwrap();
    assert_eq!(pr.assigned_reviewers, vec![UserId::from("r1")]);

    s.users.set_is_active(&"r2".into(), true).await.unwrap();

    let result = s
        .pull_requests
        .reassign_reviewer(&"pr-1".into(), &"r1".into())
        .await
        .unwrap();

    assert_eq!(result.replaced_by, UserId::from("r2"));
    assert_eq!(result.pull_request.assigned_reviewers, vec![UserId::from("r2")]);

    let r1 = s.users.review_assignments(&"r1".into()).await.unwrap();
    assert!(r1.pull_requests.is_empty());
    let r2 = s.users.review_assignments(&"r2".into()).await.unwrap();
    assert_eq!(r2.pull_requests.len(), 1);
}

#[tokio::test]
async fn scenario_c_no_candidate_after_deactivation() {
    let db = Database::in_memory().await.unwrap();
    let s = services(&db, 5);
    let team = Team::new("backend")
        .with_member(TeamMember::new("author", "Author"))
        .with_member(TeamMember::new("r1", "Reviewer 1"))
        .with_member(TeamMember::new("r2", "Reviewer 2").with_active(false));
    s.teams.create_team(&team).await.unwrap();
    s.pull_requests
        .create_pr("pr-1".into(), "T", &"author".into())
        .await
        .unwrap();

    let err = s
        .pull_requests
        .reassign_reviewer(&"pr-1".into(), &"r1".into())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoCandidate));
    let pr = db_pull_request(&db, "pr-1").await;
    assert_eq!(pr.assigned_reviewers, vec![UserId::from("r1")]);
}

#[tokio::test]
async fn scenario_d_merged_pr_is_frozen() {
    let db = Database::in_memory().await.unwrap();
    let s = services(&db, 9);
    s.teams.create_team(&backend_team()).await.unwrap();
    s.pull_requests
        .create_pr("pr-1".into(), "T", &"author".into())
        .await
        .unwrap();

    let first = s.pull_requests.merge_pr(&"pr-1".into()).await.unwrap();
    let second = s.pull_requests.merge_pr(&"pr-1".into()).await.unwrap();
    assert_eq!(first.merged_at, second.merged_at);

    let err = s
        .pull_requests
        .reassign_reviewer(&"pr-1".into(), &"r1".into())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PrMerged(_)));
}

/// Commits a competing reassignment of `r1` right after the coordinator reads
struct CompetingSwapStore {
    inner: PullRequestsRepo,
    raced: AtomicBool,
    reassign_calls: AtomicUsize,
}

#[async_trait]
impl PullRequestStore for CompetingSwapStore {
    async fn create(&self, pull_request: NewPullRequest) -> reviewer_core::Result<PullRequest> {
        self.inner.create(pull_request).await
    }

    async fn get(&self, pull_request_id: &PullRequestId) -> reviewer_core::Result<PullRequest> {
        let snapshot = self.inner.get(pull_request_id).await?;
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner
                .reassign_reviewer(pull_request_id, &"r1".into(), &"r2".into())
                .await?;
        }
        Ok(snapshot)
    }

    async fn merge(&self, pull_request_id: &PullRequestId) -> reviewer_core::Result<PullRequest> {
        self.inner.merge(pull_request_id).await
    }

    async fn reassign_reviewer(
        &self,
        pull_request_id: &PullRequestId,
        old: &UserId,
        new: &UserId,
    ) -> reviewer_core::Result<PullRequest> {
        self.reassign_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reassign_reviewer(pull_request_id, old, new).await
    }

    async fn list_by_reviewer(
        &self,
        user_id: &UserId,
    ) -> reviewer_core::Result<Vec<PullRequestShort>> {
        self.inner.list_by_reviewer(user_id).await
    }
}

#[tokio::test]
async fn reassignment_after_competing_swap_is_rejected_at_write() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::connect(&DatabaseConfig {
        path: temp_dir.path().join("race.db"),
        max_connections: 4,
    })
    .await
    .unwrap();
    let s = services(&db, 21);
    s.teams.create_team(&backend_team()).await.unwrap();
    db.pull_requests()
        .create(NewPullRequest {
            pull_request_id: "pr-1".into(),
            pull_request_name: "T".to_string(),
            author_id: "author".into(),
            assigned_reviewers: vec!["r1".into()],
        })
        .await
        .unwrap();

    let store = Arc::new(CompetingSwapStore {
        inner: db.pull_requests(),
        raced: AtomicBool::new(false),
        reassign_calls: AtomicUsize::new(0),
    });
    let service = PullRequestService::new(
        store.clone(),
        Arc::new(db.users()),
        AssignmentPolicy::seeded(21),
    );

    let err = service
        .reassign_reviewer(&"pr-1".into(), &"r1".into())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotAssigned { .. }), "unexpected error: {}", err);
    assert_eq!(store.reassign_calls.load(Ordering::SeqCst), 1);

    let pr = db_pull_request(&db, "pr-1").await;
    assert_eq!(pr.assigned_reviewers, vec![UserId::from("r2")]);
}

async fn db_pull_request(db: &Database, id: &str) -> PullRequest {
    db.pull_requests().get(&id.into()).await.unwrap()
}
