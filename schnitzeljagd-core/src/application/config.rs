use crate::application::TrackerTiming;
use crate::domain::{CatalogConfig, GeoPoint, Scoring};
use std::time::Duration;

/// Origin used when no position fix arrives in time (Bern)
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint {
    lat: 46.9480,
    lng: 7.4474,
};

/// Everything a game session can be tuned with
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub catalog: CatalogConfig,
    pub scoring: Scoring,
    pub default_origin: GeoPoint,
    /// Bound on the initial position fix at run start
    pub location_timeout: Duration,
    pub timing: TrackerTiming,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            scoring: Scoring::default(),
            default_origin: DEFAULT_ORIGIN,
            location_timeout: Duration::from_secs(10),
            timing: TrackerTiming::default(),
        }
    }
}

impl GameConfig {
    pub fn with_catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_default_origin(mut self, origin: GeoPoint) -> Self {
        self.default_origin = origin;
        self
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    pub fn with_timing(mut self, timing: TrackerTiming) -> Self {
        self.timing = timing;
        self
    }
}
