use crate::domain::{RunResult, StoredScore};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Leaderboard rejected submission ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Local score persistence. The source of truth for the leaderboard view.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// All stored scores, newest first
    async fn get_runs(&self) -> Result<Vec<StoredScore>, StoreError>;

    /// Prepend a score
    async fn save_run(&self, score: StoredScore) -> Result<(), StoreError>;

    async fn clear_runs(&self) -> Result<(), StoreError>;
}

/// Remote leaderboard. Submission is best-effort.
#[async_trait]
pub trait LeaderboardClient: Send + Sync {
    async fn submit(&self, result: &RunResult) -> Result<(), LeaderboardError>;
}
