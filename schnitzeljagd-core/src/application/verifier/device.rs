use super::{ChallengeStatus, Verdict};
use crate::traits::{CapabilityError, NetworkStatus};

pub(crate) struct QrCheck {
    expected: String,
}

impl QrCheck {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    pub fn on_scan(&self, scan: &Result<Option<String>, CapabilityError>) -> Verdict {
        match scan {
            Ok(Some(payload)) if payload.is_empty() => {
                Verdict::Pending(ChallengeStatus::NoCodeDetected)
            }
            Ok(Some(payload)) if *payload == self.expected => {
                Verdict::Done(ChallengeStatus::CodeAccepted)
            }
            Ok(Some(payload)) => {
                tracing::debug!("Scanned unexpected payload {:?}", payload);
                Verdict::Pending(ChallengeStatus::WrongCode)
            }
            Ok(None) => Verdict::Pending(ChallengeStatus::NoCodeDetected),
            Err(CapabilityError::PermissionDenied(_)) => {
                Verdict::Pending(ChallengeStatus::CameraDenied)
            }
            Err(CapabilityError::Cancelled) => Verdict::Pending(ChallengeStatus::ScanCancelled),
            Err(e) => {
                tracing::warn!("QR scan failed: {}", e);
                Verdict::Pending(ChallengeStatus::ScanFailed)
            }
        }
    }
}

pub(crate) struct ChargingCheck;

impl ChargingCheck {
    pub fn on_reading(&self, reading: &Result<Option<bool>, CapabilityError>) -> Verdict {
        match reading {
            Ok(Some(true)) => Verdict::Done(ChallengeStatus::Charging),
            Ok(Some(false)) => Verdict::Pending(ChallengeStatus::NotCharging),
            Ok(None) => Verdict::Pending(ChallengeStatus::ChargingStatusUnknown),
            Err(e) => {
                tracing::debug!("Battery status unavailable: {}", e);
                Verdict::Pending(ChallengeStatus::ChargingStatusUnknown)
            }
        }
    }
}

/// Done once both a connected and a disconnected status were observed
#[derive(Default)]
pub(crate) struct WifiToggleCheck {
    seen_connected: bool,
    seen_disconnected: bool,
}

impl WifiToggleCheck {
    pub fn on_status(&mut self, status: &Result<NetworkStatus, CapabilityError>) -> Verdict {
        match status {
            Ok(status) if status.connected => self.seen_connected = true,
            Ok(_) => self.seen_disconnected = true,
            Err(e) => {
                tracing::debug!("Network status unavailable: {}", e);
                return Verdict::Pending(ChallengeStatus::NetworkStatusUnknown);
            }
        }

        if self.seen_connected && self.seen_disconnected {
            Verdict::Done(ChallengeStatus::NetworkSwitched)
        } else {
            Verdict::Pending(ChallengeStatus::WaitingForNetworkChange {
                seen_connected: self.seen_connected,
                seen_disconnected: self.seen_disconnected,
            })
        }
    }
}
