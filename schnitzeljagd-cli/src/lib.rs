pub mod application;
pub mod infrastructure;

pub use application::{Replay, ReplayOutcome, Scenario, Step};
pub use infrastructure::{
    CliError, HttpLeaderboard, JsonFileResultStore, LogConfig, Result, ScriptedDevice,
};
