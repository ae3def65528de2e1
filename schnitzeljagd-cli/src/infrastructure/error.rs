use schnitzeljagd_core::{GameError, StoreError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Scenario file not found: {path}")]
    ScenarioNotFound { path: PathBuf },

    #[error("Scenario step {step} failed: {reason}")]
    ScenarioStep { step: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CliError {
    pub fn scenario_not_found(path: PathBuf) -> Self {
        CliError::ScenarioNotFound { path }
    }

    pub fn step(step: usize, reason: impl Into<String>) -> Self {
        CliError::ScenarioStep {
            step,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
