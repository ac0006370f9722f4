//! Reviewer selection policy
//!
//! Pure decision logic: given a candidate pool that the caller has already
//! filtered (active, same team, exclusions removed), pick reviewers at random.
//! The generator is injected at construction so tests can seed it, and it is
//! held behind a mutex so a single policy can serve concurrent requests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::config::AssignmentConfig;
use crate::domain::UserId;
use crate::{Error, Result};

/// Number of reviewers assigned to a newly created pull request
pub const INITIAL_REVIEWER_COUNT: usize = 2;

/// Random reviewer selection
pub struct AssignmentPolicy {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl AssignmentPolicy {
    /// Create a policy driven by the given generator
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Create a policy seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Create a reproducible policy
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Create a policy from configuration
    pub fn from_config(config: &AssignmentConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Pick up to [`INITIAL_REVIEWER_COUNT`] reviewers
    ///
    /// Shuffles the pool uniformly and keeps a prefix. An empty pool is not
    /// an error: the pull request simply starts without reviewers.
    pub fn select_initial_reviewers(&self, mut candidates: Vec<UserId>) -> Vec<UserId> {
        candidates.shuffle(&mut *self.rng());
        candidates.truncate(INITIAL_REVIEWER_COUNT);
        candidates
    }

    /// Pick exactly one replacement reviewer
    pub fn select_replacement(&self, candidates: &[UserId]) -> Result<UserId> {
        candidates
            .choose(&mut *self.rng())
            .cloned()
            .ok_or(Error::NoCandidate)
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RngCore + Send>> {
        // The generator holds no invariant a panic could break
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for AssignmentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentPolicy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn ids(names: &[&str]) -> Vec<UserId> {
        names.iter().map(|n| UserId::from(*n)).collect()
    }

    #[test]
    fn test_initial_reviewers_empty_pool() {
        let policy = AssignmentPolicy::seeded(1);
        assert!(policy.select_initial_reviewers(Vec::new()).is_empty());
    }

    #[test]
    fn test_initial_reviewers_single_candidate() {
        let policy = AssignmentPolicy::seeded(1);
        let selected = policy.select_initial_reviewers(ids(&["r1"]));
        assert_eq!(selected, ids(&["r1"]));
    }

    #[test]
    fn test_initial_reviewers_is_subset_without_duplicates() {
        let policy = AssignmentPolicy::seeded(7);
        let pool = ids(&["r1", "r2", "r3", "r4", "r5"]);

        for _ in 0..50 {
            let selected = policy.select_initial_reviewers(pool.clone());
            assert_eq!(selected.len(), INITIAL_REVIEWER_COUNT);

            let unique: HashSet<_> = selected.iter().collect();
            assert_eq!(unique.len(), selected.len());
            assert!(selected.iter().all(|r| pool.contains(r)));
        }
    }

    #[test]
    fn test_initial_reviewers_covers_whole_pool() {
        let policy = AssignmentPolicy::seeded(42);
        let pool = ids(&["r1", "r2", "r3", "r4"]);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(policy.select_initial_reviewers(pool.clone()));
        }

        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_same_seed_same_choice() {
        let pool = ids(&["r1", "r2", "r3", "r4", "r5", "r6"]);

        let a = AssignmentPolicy::seeded(99).select_initial_reviewers(pool.clone());
        let b = AssignmentPolicy::seeded(99).select_initial_reviewers(pool);
        assert_eq!(a, b);
    }

    #[test]
    fn test_replacement_empty_pool() {
        let policy = AssignmentPolicy::seeded(1);
        let err = policy.select_replacement(&[]).unwrap_err();
        assert!(matches!(err, Error::NoCandidate));
    }

    #[test]
    fn test_replacement_from_pool() {
        let policy = AssignmentPolicy::seeded(3);
        let pool = ids(&["r1", "r2", "r3"]);

        for _ in 0..20 {
            let chosen = policy.select_replacement(&pool).unwrap();
            assert!(pool.contains(&chosen));
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let policy = Arc::new(AssignmentPolicy::seeded(5));
        let pool = ids(&["r1", "r2", "r3"]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let policy = Arc::clone(&policy);
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let chosen = policy.select_replacement(&pool).unwrap();
                        assert!(pool.contains(&chosen));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
