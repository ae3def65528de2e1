pub mod replay;

pub use replay::{Replay, ReplayOutcome, Scenario, Step};
