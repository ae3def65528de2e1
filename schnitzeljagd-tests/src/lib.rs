use chrono::{TimeZone, Utc};
use cucumber::World;
use schnitzeljagd_core::{
    Capabilities, ChallengeVerifier, GameConfig, GameSession, GeoPoint, ManualClock,
    MemoryResultStore, RunProgress, Scoring,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, World)]
pub struct HuntWorld {
    /// Game session under test, on a device without capabilities
    pub session: GameSession,

    pub clock: ManualClock,

    pub store: Arc<MemoryResultStore>,

    /// Outcome of the last complete or skip
    pub last_progress: Option<RunProgress>,

    /// Scoring override for formula checks
    pub scoring: Option<Scoring>,

    /// Verifier driven directly by capability events
    pub verifier: Option<ChallengeVerifier>,

    /// Number of events fed to the verifier, and the one that finished it
    pub events_fed: usize,
    pub done_after: Option<usize>,

    /// Current simulated position for walking steps
    pub position: Option<GeoPoint>,

    /// Every fix fed to the verifier, in order
    pub route: Vec<GeoPoint>,

    /// Named points for distance checks
    pub points: HashMap<String, GeoPoint>,
}

impl Default for HuntWorld {
    fn default() -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        let store = Arc::new(MemoryResultStore::new());
        let session = GameSession::new(
            GameConfig::default(),
            Capabilities::unsupported(),
            store.clone(),
        )
        .with_clock(Arc::new(clock.clone()))
        .with_seed(1);

        Self {
            session,
            clock,
            store,
            last_progress: None,
            scoring: None,
            verifier: None,
            events_fed: 0,
            done_after: None,
            position: None,
            route: Vec::new(),
            points: HashMap::new(),
        }
    }
}

impl HuntWorld {
    /// Verifier set up by a Given step (panics if none)
    pub fn verifier(&mut self) -> &mut ChallengeVerifier {
        self.verifier.as_mut().expect("No challenge set up yet")
    }

    pub fn point(&self, name: &str) -> GeoPoint {
        *self
            .points
            .get(name)
            .unwrap_or_else(|| panic!("Point '{}' not defined", name))
    }
}
