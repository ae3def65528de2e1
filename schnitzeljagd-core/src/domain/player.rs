use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used when nobody entered one
pub const DEFAULT_PLAYER_NAME: &str = "Player";

const MAX_NAME_CHARS: usize = 50;

/// Validated player display name (trimmed, 1-50 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

/// Errors that can occur when naming a player
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlayerNameError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name must be between 1 and 50 characters")]
    InvalidNameLength,
}

impl PlayerName {
    pub fn new(name: &str) -> Result<Self, PlayerNameError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(PlayerNameError::EmptyName);
        }

        if trimmed.chars().count() > MAX_NAME_CHARS {
            return Err(PlayerNameError::InvalidNameLength);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerName {
    fn default() -> Self {
        Self(DEFAULT_PLAYER_NAME.to_string())
    }
}

impl TryFrom<String> for PlayerName {
    type Error = PlayerNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PlayerName::new(&value)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
