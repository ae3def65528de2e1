use async_trait::async_trait;
use reqwest::Client;
use schnitzeljagd_core::{LeaderboardClient, LeaderboardError, RunResult};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Posts finished runs as JSON to a remote leaderboard
#[derive(Debug, Clone)]
pub struct HttpLeaderboard {
    http: Client,
    endpoint: Option<String>,
}

impl HttpLeaderboard {
    /// `None` or an empty endpoint turns submission into a no-op
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.filter(|url| !url.trim().is_empty()),
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

#[async_trait]
impl LeaderboardClient for HttpLeaderboard {
    #[instrument(skip(self, result), fields(id = %result.id))]
    async fn submit(&self, result: &RunResult) -> Result<(), LeaderboardError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            debug!("No leaderboard endpoint set, skipping submit");
            return Ok(());
        };

        let resp = self
            .http
            .post(endpoint)
            .json(result)
            .send()
            .await
            .map_err(|e| LeaderboardError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LeaderboardError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Run submitted to {}", endpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result() -> RunResult {
        RunResult {
            id: Default::default(),
            name: "Alice".to_string(),
            completed_at: Utc::now(),
            schnitzel: 5,
            kartoffeln: 0,
            duration_seconds: 300,
            schnitzel_bonus: 500,
            kartoffel_malus: 0,
            points: 500,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_is_noop() {
        let leaderboard = HttpLeaderboard::new(None);
        assert!(leaderboard.endpoint().is_none());
        leaderboard.submit(&result()).await.unwrap();

        let blank = HttpLeaderboard::new(Some("  ".to_string()));
        assert!(blank.endpoint().is_none());
        blank.submit(&result()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let leaderboard = HttpLeaderboard::new(Some("http://127.0.0.1:9/scores".to_string()));
        assert!(matches!(
            leaderboard.submit(&result()).await,
            Err(LeaderboardError::Request(_))
        ));
    }
}
