use crate::domain::PlayerNameError;
use crate::traits::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("A run is already active")]
    RunAlreadyActive,

    #[error("No active run")]
    NoActiveRun,

    #[error("The current challenge is not done yet")]
    ChallengeNotDone,

    #[error("Invalid player name: {0}")]
    InvalidPlayerName(#[from] PlayerNameError),

    #[error("Could not persist the result: {0}")]
    Store(#[from] StoreError),
}
