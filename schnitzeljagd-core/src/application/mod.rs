mod config;
mod errors;
mod runtime;
mod session;
mod tracker;
pub mod verifier;

pub use config::{GameConfig, DEFAULT_ORIGIN};
pub use errors::GameError;
pub use runtime::GameRuntime;
pub use session::{EventHook, GameSession, RunProgress};
pub use tracker::{ChallengeTracker, TrackerSnapshot, TrackerTiming};
pub use verifier::{CapabilityEvent, ChallengeStatus, ChallengeVerifier, VerifierState};
