use serde::Serialize;
use std::fmt;

/// Lifecycle of a single challenge verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierState {
    Tracking,
    Done,
    Aborted,
}

impl VerifierState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerifierState::Tracking)
    }
}

/// What the player is told about the current challenge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChallengeStatus {
    // geo-target
    SearchingTarget,
    DistanceToTarget { meters: u64 },
    TargetReached,
    LocationUnavailable,

    // distance
    TrackingStarted,
    DistanceRemaining { walked: u64, remaining: u64 },
    DistanceReached,

    // qr
    ReadyToScan,
    CameraDenied,
    NoCodeDetected,
    WrongCode,
    ScanCancelled,
    ScanFailed,
    CodeAccepted,

    // charging
    CheckingCharging,
    NotCharging,
    ChargingStatusUnknown,
    Charging,

    // wifi
    WaitingForNetworkChange {
        seen_connected: bool,
        seen_disconnected: bool,
    },
    NetworkStatusUnknown,
    NetworkSwitched,

    // sensor
    SensorListening { upside_down: bool, shakes: u32 },
    SensorWindowExpired,
    SensorUnavailable,
    SensorCompleted,
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ChallengeStatus::*;
        match self {
            SearchingTarget => write!(f, "Searching for your location..."),
            DistanceToTarget { meters } => write!(f, "{} m to go", meters),
            TargetReached => write!(f, "Location found"),
            LocationUnavailable => write!(f, "Location not found"),
            TrackingStarted => write!(f, "Distance tracking is starting..."),
            DistanceRemaining { walked, remaining } => {
                write!(f, "{} m walked, {} m to go", walked, remaining)
            }
            DistanceReached => write!(f, "Distance reached"),
            ReadyToScan => write!(f, "Ready to scan"),
            CameraDenied => write!(f, "Camera access denied"),
            NoCodeDetected => write!(f, "No QR code detected"),
            WrongCode => write!(f, "Wrong QR code"),
            ScanCancelled => write!(f, "Scan cancelled"),
            ScanFailed => write!(f, "Scan failed"),
            CodeAccepted => write!(f, "QR code accepted"),
            CheckingCharging => write!(f, "Checking charging status..."),
            NotCharging => write!(f, "Not plugged in"),
            ChargingStatusUnknown => write!(f, "Battery status unavailable"),
            Charging => write!(f, "Device is charging"),
            WaitingForNetworkChange {
                seen_connected,
                seen_disconnected,
            } => match (seen_connected, seen_disconnected) {
                (true, false) => write!(f, "Connected, now disconnect"),
                (false, true) => write!(f, "Disconnected, now connect"),
                _ => write!(f, "Waiting for a network change..."),
            },
            NetworkStatusUnknown => write!(f, "Network status unavailable"),
            NetworkSwitched => write!(f, "Network switched"),
            SensorListening { upside_down, shakes } => write!(
                f,
                "Upside down: {}, shakes: {}/2",
                if *upside_down { "yes" } else { "no" },
                shakes
            ),
            SensorWindowExpired => write!(f, "Time is up, try again"),
            SensorUnavailable => write!(f, "Motion sensors unavailable"),
            SensorCompleted => write!(f, "Sensor task done"),
        }
    }
}
