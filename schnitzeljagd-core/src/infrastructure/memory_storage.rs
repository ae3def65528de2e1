use crate::domain::{RunResult, StoredScore};
use crate::traits::{LeaderboardClient, LeaderboardError, ResultStore, StoreError};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, instrument};

/// In-process score list, newest first. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultStore {
    scores: Arc<RwLock<Vec<StoredScore>>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing scores, newest first
    pub fn with_scores(scores: Vec<StoredScore>) -> Self {
        Self {
            scores: Arc::new(RwLock::new(scores)),
        }
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    #[instrument(skip(self))]
    async fn get_runs(&self) -> Result<Vec<StoredScore>, StoreError> {
        match self.scores.read() {
            Ok(scores) => {
                debug!(score_count = scores.len(), "Retrieved all scores");
                Ok(scores.clone())
            }
            Err(e) => {
                error!(?e, "Failed to read scores");
                Err(StoreError::Unavailable(e.to_string()))
            }
        }
    }

    #[instrument(skip(self, score), fields(name = %score.name, points = score.points))]
    async fn save_run(&self, score: StoredScore) -> Result<(), StoreError> {
        match self.scores.write() {
            Ok(mut scores) => {
                scores.insert(0, score);
                debug!("Score saved");
                Ok(())
            }
            Err(e) => {
                error!(?e, "Failed to save score");
                Err(StoreError::Unavailable(e.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn clear_runs(&self) -> Result<(), StoreError> {
        match self.scores.write() {
            Ok(mut scores) => {
                scores.clear();
                debug!("Scores cleared");
                Ok(())
            }
            Err(e) => {
                error!(?e, "Failed to clear scores");
                Err(StoreError::Unavailable(e.to_string()))
            }
        }
    }
}

/// Leaderboard client for setups without a remote endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLeaderboard;

#[async_trait]
impl LeaderboardClient for NoopLeaderboard {
    async fn submit(&self, result: &RunResult) -> Result<(), LeaderboardError> {
        debug!(id = %result.id, "No leaderboard endpoint configured, skipping submit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn score(name: &str, points: u32) -> StoredScore {
        StoredScore {
            name: name.to_string(),
            completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            points,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryResultStore::new();
        assert!(store.get_runs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_prepends() {
        let store = MemoryResultStore::new();
        store.save_run(score("first", 100)).await.unwrap();
        store.save_run(score("second", 200)).await.unwrap();

        let runs = store.get_runs().await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].name, "second");
        assert_eq!(runs[1].name, "first");
    }

    #[tokio::test]
    async fn test_clear_runs() {
        let store = MemoryResultStore::with_scores(vec![score("a", 1), score("b", 2)]);
        store.clear_runs().await.unwrap();
        assert!(store.get_runs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_scores() {
        let store = MemoryResultStore::new();
        let other = store.clone();
        store.save_run(score("shared", 5)).await.unwrap();
        assert_eq!(other.get_runs().await.unwrap().len(), 1);
    }
}
