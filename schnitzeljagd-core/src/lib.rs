pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod traits;

pub use application::{
    CapabilityEvent, ChallengeStatus, ChallengeTracker, ChallengeVerifier, GameConfig, GameError,
    GameRuntime, GameSession, RunProgress, TrackerSnapshot, TrackerTiming, VerifierState,
    DEFAULT_ORIGIN,
};
pub use domain::{
    ActiveRun, CatalogConfig, Challenge, ChallengeCatalog, ChallengeConfig, ChallengeKind, Clock,
    GeoPoint, LeaderboardSummary, ManualClock, PlayerName, PlayerNameError, RunEvent, RunResult,
    Scoring, StoredScore, SystemClock,
};
pub use infrastructure::{MemoryResultStore, NoopLeaderboard};
pub use traits::{
    Capabilities, Capability, CapabilityError, LeaderboardClient, LeaderboardError, ResultStore,
    StoreError,
};
