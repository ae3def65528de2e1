use crate::domain::GeoPoint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of challenge types a run can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Reach a random point near the start
    GeoTarget,
    /// Walk a minimum distance
    Distance,
    /// Scan the expected QR code
    Qr,
    /// Turn the device upside down and shake it
    Sensor,
    /// Plug the device into power
    Charging,
    /// Observe both a connected and a disconnected network state
    #[serde(rename = "wifi")]
    WifiToggle,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChallengeKind::GeoTarget => "geo_target",
            ChallengeKind::Distance => "distance",
            ChallengeKind::Qr => "qr",
            ChallengeKind::Sensor => "sensor",
            ChallengeKind::Charging => "charging",
            ChallengeKind::WifiToggle => "wifi",
        };
        write!(f, "{}", name)
    }
}

/// Verification parameters, one variant per [`ChallengeKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeConfig {
    GeoTarget {
        /// Generated lazily from the first fix when absent
        #[serde(default)]
        target: Option<GeoPoint>,
        radius_m: f64,
    },
    Distance {
        goal_m: u32,
    },
    Qr {
        expected: String,
    },
    Sensor,
    Charging,
    #[serde(rename = "wifi")]
    WifiToggle,
}

impl ChallengeConfig {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            ChallengeConfig::GeoTarget { .. } => ChallengeKind::GeoTarget,
            ChallengeConfig::Distance { .. } => ChallengeKind::Distance,
            ChallengeConfig::Qr { .. } => ChallengeKind::Qr,
            ChallengeConfig::Sensor => ChallengeKind::Sensor,
            ChallengeConfig::Charging => ChallengeKind::Charging,
            ChallengeConfig::WifiToggle => ChallengeKind::WifiToggle,
        }
    }
}

/// One task of a run. Immutable once the catalog produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Challenge {
    pub title: String,
    pub intro: String,

    /// Label of the user-triggered action (scan, check status, ...)
    pub primary_cta: String,

    /// Completing later than this many seconds earns a kartoffel
    pub late_after_secs: u64,

    pub config: ChallengeConfig,
}

impl Challenge {
    pub fn new(
        config: ChallengeConfig,
        title: impl Into<String>,
        intro: impl Into<String>,
        primary_cta: impl Into<String>,
        late_after_secs: u64,
    ) -> Self {
        Self {
            title: title.into(),
            intro: intro.into(),
            primary_cta: primary_cta.into(),
            late_after_secs,
            config,
        }
    }

    pub fn kind(&self) -> ChallengeKind {
        self.config.kind()
    }

    /// Whether a completion after `elapsed_secs` counts as late
    pub fn is_late(&self, elapsed_secs: f64) -> bool {
        elapsed_secs > self.late_after_secs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_config() {
        let challenge = Challenge::new(
            ChallengeConfig::Distance { goal_m: 40 },
            "Walk",
            "Walk 40 m",
            "Start tracking",
            300,
        );
        assert_eq!(challenge.kind(), ChallengeKind::Distance);
        assert_eq!(ChallengeConfig::WifiToggle.kind(), ChallengeKind::WifiToggle);
    }

    #[test]
    fn test_is_late_is_strict() {
        let challenge = Challenge::new(ChallengeConfig::Charging, "Charge", "", "Check", 120);
        assert!(!challenge.is_late(119.9));
        assert!(!challenge.is_late(120.0));
        assert!(challenge.is_late(120.5));
    }

    #[test]
    fn test_config_serialization_is_tagged() {
        let config = ChallengeConfig::Qr {
            expected: "Schnitzeljagd-OK".to_string(),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["kind"], "qr");
        assert_eq!(json["expected"], "Schnitzeljagd-OK");

        let wifi = serde_json::to_value(ChallengeConfig::WifiToggle).unwrap();
        assert_eq!(wifi["kind"], "wifi");
    }

    #[test]
    fn test_geo_target_without_target_deserializes() {
        let json = serde_json::json!({ "kind": "geo_target", "radius_m": 25.0 });
        let config: ChallengeConfig = serde_json::from_value(json).unwrap();
        assert_eq!(
            config,
            ChallengeConfig::GeoTarget {
                target: None,
                radius_m: 25.0
            }
        );
    }

    #[test]
    fn test_kind_display_matches_serde_name() {
        for kind in [
            ChallengeKind::GeoTarget,
            ChallengeKind::Distance,
            ChallengeKind::Qr,
            ChallengeKind::Sensor,
            ChallengeKind::Charging,
            ChallengeKind::WifiToggle,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }
}
