use crate::domain::geo::{random_distance_meters, random_point_in_ring};
use crate::domain::{Challenge, ChallengeConfig, GeoPoint};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Payload the QR challenge expects unless configured otherwise
pub const DEFAULT_QR_PAYLOAD: &str = "Schnitzeljagd-OK";

/// Late thresholds per challenge kind, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateThresholds {
    pub geo_target: u64,
    pub distance: u64,
    pub qr: u64,
    pub sensor: u64,
    pub charging: u64,
    pub wifi: u64,
}

impl Default for LateThresholds {
    fn default() -> Self {
        Self {
            geo_target: 180,
            distance: 300,
            qr: 120,
            sensor: 120,
            charging: 120,
            wifi: 180,
        }
    }
}

/// Knobs for challenge generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Geo target lies between these distances from the origin
    pub geo_min_m: f64,
    pub geo_max_m: f64,

    /// Acceptance radius around the geo target
    pub geo_radius_m: f64,

    /// Walking goal range, inclusive
    pub distance_min_m: u32,
    pub distance_max_m: u32,

    pub qr_expected: String,

    /// Adds the orientation/motion challenge after the QR scan
    pub include_sensor: bool,

    pub late: LateThresholds,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            geo_min_m: 1_000.0,
            geo_max_m: 2_000.0,
            geo_radius_m: 25.0,
            distance_min_m: 30,
            distance_max_m: 80,
            qr_expected: DEFAULT_QR_PAYLOAD.to_string(),
            include_sensor: false,
            late: LateThresholds::default(),
        }
    }
}

impl CatalogConfig {
    pub fn with_sensor(mut self, include: bool) -> Self {
        self.include_sensor = include;
        self
    }

    pub fn with_qr_expected(mut self, payload: impl Into<String>) -> Self {
        self.qr_expected = payload.into();
        self
    }
}

/// Builds the fixed-order challenge list for a run
#[derive(Debug, Clone, Default)]
pub struct ChallengeCatalog {
    config: CatalogConfig,
}

impl ChallengeCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Number of challenges every run of this catalog has
    pub fn len(&self) -> usize {
        if self.config.include_sensor {
            6
        } else {
            5
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generate the challenges around `origin`
    pub fn build<R: Rng + ?Sized>(&self, origin: GeoPoint, rng: &mut R) -> Vec<Challenge> {
        let cfg = &self.config;

        let target = random_point_in_ring(rng, origin.lat, origin.lng, cfg.geo_min_m, cfg.geo_max_m);
        let goal_m = random_distance_meters(rng, cfg.distance_min_m, cfg.distance_max_m);

        let mut challenges = vec![
            Challenge::new(
                ChallengeConfig::GeoTarget {
                    target: Some(target),
                    radius_m: cfg.geo_radius_m,
                },
                "Find the spot",
                format!("Head to a random location near you.\n{}", target),
                "Check location",
                cfg.late.geo_target,
            ),
            Challenge::new(
                ChallengeConfig::Distance { goal_m },
                "Cover the distance",
                format!("Walk at least {} meters.", goal_m),
                "Start tracking",
                cfg.late.distance,
            ),
            Challenge::new(
                ChallengeConfig::Qr {
                    expected: cfg.qr_expected.clone(),
                },
                "Scan the QR code",
                "Scan the right QR code.",
                "Scan QR code",
                cfg.late.qr,
            ),
        ];

        if cfg.include_sensor {
            challenges.push(Challenge::new(
                ChallengeConfig::Sensor,
                "Sensor task",
                "Turn your device upside down and shake it twice.",
                "Check sensors",
                cfg.late.sensor,
            ));
        }

        challenges.push(Challenge::new(
            ChallengeConfig::Charging,
            "Charge your device",
            "Plug your device into power.",
            "Check status",
            cfg.late.charging,
        ));

        challenges.push(Challenge::new(
            ChallengeConfig::WifiToggle,
            "Switch networks",
            "Connect to a Wi-Fi network and disconnect again.",
            "Check network status",
            cfg.late.wifi,
        ));

        tracing::debug!(
            "Built {} challenges around {} (geo target {}, walk {} m)",
            challenges.len(),
            origin,
            target,
            goal_m
        );

        challenges
    }
}
