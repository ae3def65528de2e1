//! Per-challenge completion checks. A verifier is fed capability events in
//! delivery order and moves from `Tracking` to `Done` or `Aborted`, never back.

mod device;
mod location;
mod sensor;
mod status;

pub use location::LAZY_TARGET_RADIUS_M;
pub use sensor::{is_upside_down, REQUIRED_SHAKES, SHAKE_THRESHOLD, UPSIDE_DOWN_TOLERANCE_DEG};
pub use status::{ChallengeStatus, VerifierState};

use crate::domain::{Challenge, ChallengeConfig, ChallengeKind, GeoPoint};
use crate::traits::{CapabilityError, MotionSample, NetworkStatus, OrientationSample};
use device::{ChargingCheck, QrCheck, WifiToggleCheck};
use location::{DistanceCheck, GeoTargetCheck};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sensor::SensorCheck;

/// Everything a capability can report to a verifier
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityEvent {
    Position(Result<GeoPoint, CapabilityError>),
    Network(Result<NetworkStatus, CapabilityError>),
    Charging(Result<Option<bool>, CapabilityError>),
    Scan(Result<Option<String>, CapabilityError>),
    Orientation(OrientationSample),
    Motion(MotionSample),
    SensorWindowOpened,
    SensorWindowClosed,
    SensorUnavailable(CapabilityError),
}

pub(crate) enum Verdict {
    Pending(ChallengeStatus),
    Done(ChallengeStatus),
}

enum Check {
    GeoTarget(GeoTargetCheck),
    Distance(DistanceCheck),
    Qr(QrCheck),
    Sensor(SensorCheck),
    Charging(ChargingCheck),
    WifiToggle(WifiToggleCheck),
}

pub struct ChallengeVerifier {
    kind: ChallengeKind,
    state: VerifierState,
    status: ChallengeStatus,
    check: Check,
}

impl ChallengeVerifier {
    pub fn new(challenge: &Challenge) -> Self {
        Self::build(challenge, StdRng::from_os_rng())
    }

    /// Deterministic variant; the seed only matters for a lazily picked geo target
    pub fn with_seed(challenge: &Challenge, seed: u64) -> Self {
        Self::build(challenge, StdRng::seed_from_u64(seed))
    }

    fn build(challenge: &Challenge, rng: StdRng) -> Self {
        let (check, status) = match &challenge.config {
            ChallengeConfig::GeoTarget { target, radius_m } => (
                Check::GeoTarget(GeoTargetCheck::new(*target, *radius_m, rng)),
                ChallengeStatus::SearchingTarget,
            ),
            ChallengeConfig::Distance { goal_m } => (
                Check::Distance(DistanceCheck::new(*goal_m)),
                ChallengeStatus::TrackingStarted,
            ),
            ChallengeConfig::Qr { expected } => (
                Check::Qr(QrCheck::new(expected.clone())),
                ChallengeStatus::ReadyToScan,
            ),
            ChallengeConfig::Sensor => (
                Check::Sensor(SensorCheck::default()),
                ChallengeStatus::SensorListening {
                    upside_down: false,
                    shakes: 0,
                },
            ),
            ChallengeConfig::Charging => (
                Check::Charging(ChargingCheck),
                ChallengeStatus::CheckingCharging,
            ),
            ChallengeConfig::WifiToggle => (
                Check::WifiToggle(WifiToggleCheck::default()),
                ChallengeStatus::WaitingForNetworkChange {
                    seen_connected: false,
                    seen_disconnected: false,
                },
            ),
        };

        Self {
            kind: challenge.kind(),
            state: VerifierState::Tracking,
            status,
            check,
        }
    }

    /// Apply one event. Returns `false` when the event was ignored, either
    /// because the verifier is terminal or the event does not concern it.
    pub fn handle(&mut self, event: CapabilityEvent) -> bool {
        if self.state.is_terminal() {
            tracing::trace!("{} verifier is {:?}, ignoring {:?}", self.kind, self.state, event);
            return false;
        }

        let verdict = match (&mut self.check, &event) {
            (Check::GeoTarget(check), CapabilityEvent::Position(fix)) => Some(check.on_position(fix)),
            (Check::Distance(check), CapabilityEvent::Position(fix)) => Some(check.on_position(fix)),
            (Check::Qr(check), CapabilityEvent::Scan(scan)) => Some(check.on_scan(scan)),
            (Check::Charging(check), CapabilityEvent::Charging(reading)) => {
                Some(check.on_reading(reading))
            }
            (Check::WifiToggle(check), CapabilityEvent::Network(status)) => {
                Some(check.on_status(status))
            }
            (Check::Sensor(check), CapabilityEvent::SensorWindowOpened) => Some(check.open_window()),
            (Check::Sensor(check), CapabilityEvent::SensorWindowClosed) => {
                Some(check.close_window())
            }
            (Check::Sensor(check), CapabilityEvent::SensorUnavailable(e)) => {
                tracing::debug!("Motion sensors unavailable: {}", e);
                Some(check.unavailable())
            }
            (Check::Sensor(check), CapabilityEvent::Orientation(sample)) => {
                check.on_orientation(sample)
            }
            (Check::Sensor(check), CapabilityEvent::Motion(sample)) => check.on_motion(sample),
            _ => None,
        };

        match verdict {
            Some(Verdict::Pending(status)) => {
                self.status = status;
                true
            }
            Some(Verdict::Done(status)) => {
                tracing::info!("{} challenge done: {}", self.kind, status);
                self.status = status;
                self.state = VerifierState::Done;
                true
            }
            None => {
                tracing::trace!("{} verifier ignores {:?}", self.kind, event);
                false
            }
        }
    }

    /// Stop tracking. Returns `false` when already terminal.
    pub fn abort(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        tracing::debug!("{} verifier aborted", self.kind);
        self.state = VerifierState::Aborted;
        true
    }

    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    pub fn state(&self) -> VerifierState {
        self.state
    }

    pub fn status(&self) -> &ChallengeStatus {
        &self.status
    }

    pub fn is_done(&self) -> bool {
        self.state == VerifierState::Done
    }

    /// Geo target in use, once known
    pub fn target(&self) -> Option<GeoPoint> {
        match &self.check {
            Check::GeoTarget(check) => check.target(),
            _ => None,
        }
    }

    /// Walked meters of a distance challenge
    pub fn walked_m(&self) -> Option<f64> {
        match &self.check {
            Check::Distance(check) => Some(check.walked_m()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ChallengeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeVerifier")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("status", &self.status)
            .finish()
    }
}
