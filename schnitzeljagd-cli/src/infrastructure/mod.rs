pub mod error;
pub mod http_leaderboard;
pub mod json_file_store;
pub mod observability;
pub mod scripted_device;

pub use error::{CliError, Result};
pub use http_leaderboard::HttpLeaderboard;
pub use json_file_store::JsonFileResultStore;
pub use observability::LogConfig;
pub use scripted_device::ScriptedDevice;
