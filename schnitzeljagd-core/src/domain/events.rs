use crate::domain::{ChallengeKind, RunResult};
use serde::Serialize;

/// Run state transitions, fired through the session's notification hook
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// A fresh run was created at challenge 0
    RunStarted {
        player_name: String,
        challenge_count: usize,
        origin_is_fallback: bool,
    },

    ChallengeCompleted {
        index: usize,
        kind: ChallengeKind,
        late: bool,
    },

    /// Skipped without schnitzel or kartoffel
    ChallengeSkipped { index: usize, kind: ChallengeKind },

    /// Last challenge done or skipped; the result is persisted
    RunFinished { result: RunResult },

    /// Run discarded without a result
    RunAborted { index: usize },
}
