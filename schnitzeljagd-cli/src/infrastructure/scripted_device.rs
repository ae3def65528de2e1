use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use schnitzeljagd_core::traits::{
    BatteryProvider, Capabilities, Capability, CapabilityError, EventStream, Haptics,
    LocationProvider, MotionProvider, MotionSample, NetworkProvider, NetworkStatus,
    OrientationSample, PermissionProvider, PermissionState, QrScanner,
};
use schnitzeljagd_core::GeoPoint;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A device driven by a replay scenario instead of real sensors.
///
/// Subscriptions are unbounded channels; pushing a reading fans it out to
/// every live subscriber and forgets the ones that were dropped.
#[derive(Clone, Default)]
pub struct ScriptedDevice {
    state: Arc<Mutex<DeviceState>>,
}

#[derive(Default)]
struct DeviceState {
    position: Option<GeoPoint>,
    connected: bool,
    charging: Option<bool>,
    motion_sensors: bool,
    scans: VecDeque<Option<String>>,
    denied: HashSet<Capability>,
    haptic_pulses: u32,

    position_watches: Vec<UnboundedSender<Result<GeoPoint, CapabilityError>>>,
    network_watches: Vec<UnboundedSender<NetworkStatus>>,
    orientation_watches: Vec<UnboundedSender<OrientationSample>>,
    motion_watches: Vec<UnboundedSender<MotionSample>>,
}

fn fan_out<T: Clone>(watches: &mut Vec<UnboundedSender<T>>, item: T) {
    watches.retain(|tx| tx.unbounded_send(item.clone()).is_ok());
}

/// New subscriber; senders whose receiver is gone are dropped first
fn subscribe<T>(watches: &mut Vec<UnboundedSender<T>>) -> UnboundedReceiver<T> {
    watches.retain(|tx| !tx.is_closed());
    let (tx, rx) = unbounded();
    watches.push(tx);
    rx
}

fn live<T>(watches: &[UnboundedSender<T>]) -> usize {
    watches.iter().filter(|tx| !tx.is_closed()).count()
}

impl ScriptedDevice {
    pub fn new(position: Option<GeoPoint>, connected: bool, charging: Option<bool>) -> Self {
        let device = Self::default();
        {
            let mut state = device.state();
            state.position = position;
            state.connected = connected;
            state.charging = charging;
            state.motion_sensors = true;
        }
        device
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn capabilities(&self) -> Capabilities {
        let device = Arc::new(self.clone());
        Capabilities {
            location: device.clone(),
            network: device.clone(),
            battery: device.clone(),
            scanner: device.clone(),
            motion: device.clone(),
            haptics: device.clone(),
            permissions: device,
        }
    }

    // ===== Scenario input =====

    pub fn move_to(&self, point: GeoPoint) {
        let mut state = self.state();
        state.position = Some(point);
        fan_out(&mut state.position_watches, Ok(point));
    }

    pub fn set_connected(&self, connected: bool) {
        let mut state = self.state();
        state.connected = connected;
        fan_out(&mut state.network_watches, NetworkStatus { connected });
    }

    pub fn set_charging(&self, charging: Option<bool>) {
        self.state().charging = charging;
    }

    pub fn set_motion_sensors(&self, available: bool) {
        self.state().motion_sensors = available;
    }

    /// Next scan decodes `payload`
    pub fn queue_scan(&self, payload: Option<String>) {
        self.state().scans.push_back(payload);
    }

    pub fn deny(&self, capability: Capability) {
        self.state().denied.insert(capability);
    }

    pub fn tilt(&self, beta: f64) {
        fan_out(
            &mut self.state().orientation_watches,
            OrientationSample { beta, gamma: 0.0 },
        );
    }

    pub fn shake(&self, magnitude: f64) {
        fan_out(
            &mut self.state().motion_watches,
            MotionSample {
                x: magnitude,
                y: 0.0,
                z: 0.0,
            },
        );
    }

    // ===== Getters =====

    pub fn position(&self) -> Option<GeoPoint> {
        self.state().position
    }

    pub fn haptic_pulses(&self) -> u32 {
        self.state().haptic_pulses
    }

    pub fn live_subscriptions(&self) -> usize {
        let state = self.state();
        live(&state.position_watches)
            + live(&state.network_watches)
            + live(&state.orientation_watches)
            + live(&state.motion_watches)
    }
}

#[async_trait]
impl LocationProvider for ScriptedDevice {
    async fn current_position(&self) -> Result<GeoPoint, CapabilityError> {
        self.state().position.ok_or(CapabilityError::Timeout)
    }

    async fn watch_position(
        &self,
    ) -> Result<EventStream<Result<GeoPoint, CapabilityError>>, CapabilityError> {
        let mut state = self.state();
        let position = state.position;
        let rx = subscribe(&mut state.position_watches);
        if let Some((tx, point)) = state.position_watches.last().zip(position) {
            let _ = tx.unbounded_send(Ok(point));
        }
        Ok(rx.boxed())
    }
}

#[async_trait]
impl NetworkProvider for ScriptedDevice {
    async fn status(&self) -> Result<NetworkStatus, CapabilityError> {
        Ok(NetworkStatus {
            connected: self.state().connected,
        })
    }

    async fn watch_status(&self) -> Result<EventStream<NetworkStatus>, CapabilityError> {
        Ok(subscribe(&mut self.state().network_watches).boxed())
    }
}

#[async_trait]
impl BatteryProvider for ScriptedDevice {
    async fn is_charging(&self) -> Result<Option<bool>, CapabilityError> {
        Ok(self.state().charging)
    }
}

#[async_trait]
impl QrScanner for ScriptedDevice {
    async fn scan(&self) -> Result<Option<String>, CapabilityError> {
        match self.state().scans.pop_front() {
            Some(payload) => Ok(payload),
            None => Err(CapabilityError::Cancelled),
        }
    }
}

#[async_trait]
impl MotionProvider for ScriptedDevice {
    async fn watch_orientation(&self) -> Result<EventStream<OrientationSample>, CapabilityError> {
        let mut state = self.state();
        if !state.motion_sensors {
            return Err(CapabilityError::Unavailable("no orientation sensor".to_string()));
        }
        Ok(subscribe(&mut state.orientation_watches).boxed())
    }

    async fn watch_motion(&self) -> Result<EventStream<MotionSample>, CapabilityError> {
        let mut state = self.state();
        if !state.motion_sensors {
            return Err(CapabilityError::Unavailable("no motion sensor".to_string()));
        }
        Ok(subscribe(&mut state.motion_watches).boxed())
    }
}

#[async_trait]
impl Haptics for ScriptedDevice {
    async fn impact(&self) -> Result<(), CapabilityError> {
        self.state().haptic_pulses += 1;
        debug!("Haptic pulse");
        Ok(())
    }
}

#[async_trait]
impl PermissionProvider for ScriptedDevice {
    async fn check(&self, capability: Capability) -> Result<PermissionState, CapabilityError> {
        if self.state().denied.contains(&capability) {
            Ok(PermissionState::Denied)
        } else {
            Ok(PermissionState::Granted)
        }
    }

    async fn request(&self, capability: Capability) -> Result<PermissionState, CapabilityError> {
        self.check(capability).await
    }
}
