use async_trait::async_trait;
use schnitzeljagd_core::{ResultStore, StoreError, StoredScore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Scores kept as a JSON array in a single file, newest first
#[derive(Debug, Clone)]
pub struct JsonFileResultStore {
    path: PathBuf,
}

impl JsonFileResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored scores; a missing file is empty, a corrupt one reads as empty.
    /// Any other read failure is an error.
    async fn read_all(&self) -> Result<Vec<StoredScore>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No score file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Vec<StoredScore>>(&bytes) {
            Ok(scores) => {
                debug!(score_count = scores.len(), "Loaded scores");
                Ok(scores)
            }
            Err(e) => {
                warn!("Ignoring corrupt score file: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn write_all(&self, scores: &[StoredScore]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(scores)?;

        // write next to the target, then swap it in
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultStore for JsonFileResultStore {
    /// An unreadable or corrupt file reads as an empty list
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get_runs(&self) -> Result<Vec<StoredScore>, StoreError> {
        match self.read_all().await {
            Ok(scores) => Ok(scores),
            Err(e) => {
                warn!("Could not read score file: {}", e);
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self, score), fields(path = %self.path.display(), points = score.points))]
    async fn save_run(&self, score: StoredScore) -> Result<(), StoreError> {
        // an unreadable file must not be replaced by a fresh list
        let mut scores = self.read_all().await?;
        scores.insert(0, score);
        self.write_all(&scores).await?;
        debug!(score_count = scores.len(), "Score saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear_runs(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
