pub mod catalog;
pub mod challenge;
pub mod clock;
pub mod events;
pub mod geo;
pub mod leaderboard;
pub mod player;
pub mod result;
pub mod run;

pub use catalog::{CatalogConfig, ChallengeCatalog, LateThresholds, DEFAULT_QR_PAYLOAD};
pub use challenge::{Challenge, ChallengeConfig, ChallengeKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::RunEvent;
pub use geo::{
    distance_meters, random_distance_meters, random_point_in_ring, random_point_within_radius,
    GeoPoint,
};
pub use leaderboard::LeaderboardSummary;
pub use player::{PlayerName, PlayerNameError, DEFAULT_PLAYER_NAME};
pub use result::{RunResult, Scoring, StoredScore};
pub use run::ActiveRun;
