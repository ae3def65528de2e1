use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::StreamExt;
use schnitzeljagd_core::traits::{
    BatteryProvider, Capabilities, Capability, CapabilityError, EventStream, Haptics,
    LocationProvider, MotionProvider, MotionSample, NetworkProvider, NetworkStatus,
    OrientationSample, PermissionProvider, PermissionState, QrScanner,
};
use schnitzeljagd_core::GeoPoint;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// In-memory device whose sensors are driven by the test.
///
/// Every subscription is a channel; the device counts the ones whose
/// receiving side is still alive.
#[derive(Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
}

#[derive(Default)]
struct DeviceState {
    position: Option<GeoPoint>,
    fix_delay: Option<Duration>,
    connected: bool,
    charging: Option<bool>,
    scans: VecDeque<Result<Option<String>, CapabilityError>>,
    camera_denied: bool,
    haptic_pulses: u32,

    position_watches: Vec<UnboundedSender<Result<GeoPoint, CapabilityError>>>,
    network_watches: Vec<UnboundedSender<NetworkStatus>>,
    orientation_watches: Vec<UnboundedSender<OrientationSample>>,
    motion_watches: Vec<UnboundedSender<MotionSample>>,
}

fn broadcast<T: Clone>(watches: &mut Vec<UnboundedSender<T>>, item: T) {
    watches.retain(|tx| tx.unbounded_send(item.clone()).is_ok());
}

fn live<T>(watches: &[UnboundedSender<T>]) -> usize {
    watches.iter().filter(|tx| !tx.is_closed()).count()
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(lat: f64, lng: f64) -> Self {
        let device = Self::new();
        device.state().position = Some(GeoPoint::new(lat, lng));
        device
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap()
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

    // ===== Driving the sensors =====

    pub fn move_to(&self, point: GeoPoint) {
        let mut state = self.state();
        state.position = Some(point);
        broadcast(&mut state.position_watches, Ok(point));
    }

    pub fn lose_fix(&self) {
        let mut state = self.state();
        state.position = None;
        broadcast(&mut state.position_watches, Err(CapabilityError::Timeout));
    }

    /// Delay one-shot fixes, e.g. to run into the start timeout
    pub fn delay_fixes(&self, delay: Duration) {
        self.state().fix_delay = Some(delay);
    }

    pub fn set_connected(&self, connected: bool) {
        let mut state = self.state();
        state.connected = connected;
        broadcast(&mut state.network_watches, NetworkStatus { connected });
    }

    pub fn set_charging(&self, charging: Option<bool>) {
        self.state().charging = charging;
    }

    pub fn queue_scan(&self, scan: Result<Option<String>, CapabilityError>) {
        self.state().scans.push_back(scan);
    }

    pub fn deny_camera(&self) {
        self.state().camera_denied = true;
    }

    pub fn tilt(&self, beta: f64) {
        broadcast(
            &mut self.state().orientation_watches,
            OrientationSample { beta, gamma: 0.0 },
        );
    }

    pub fn shake(&self, magnitude: f64) {
        broadcast(
            &mut self.state().motion_watches,
            MotionSample {
                x: magnitude,
                y: 0.0,
                z: 0.0,
            },
        );
    }

    // ===== Observations =====

    pub fn live_position_watches(&self) -> usize {
        live(&self.state().position_watches)
    }

    pub fn live_network_watches(&self) -> usize {
        live(&self.state().network_watches)
    }

    pub fn live_sensor_watches(&self) -> usize {
        let state = self.state();
        live(&state.orientation_watches) + live(&state.motion_watches)
    }

    pub fn live_subscriptions(&self) -> usize {
        self.live_position_watches() + self.live_network_watches() + self.live_sensor_watches()
    }

    pub fn haptic_pulses(&self) -> u32 {
        self.state().haptic_pulses
    }
}

#[async_trait]
impl LocationProvider for MockDevice {
    async fn current_position(&self) -> Result<GeoPoint, CapabilityError> {
        let delay = self.state().fix_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.state().position.ok_or(CapabilityError::Timeout)
    }

    async fn watch_position(
        &self,
    ) -> Result<EventStream<Result<GeoPoint, CapabilityError>>, CapabilityError> {
        let (tx, rx) = unbounded();
        self.state().position_watches.push(tx);
        Ok(rx.boxed())
    }
}

#[async_trait]
impl NetworkProvider for MockDevice {
    async fn status(&self) -> Result<NetworkStatus, CapabilityError> {
        Ok(NetworkStatus {
            connected: self.state().connected,
        })
    }

    async fn watch_status(&self) -> Result<EventStream<NetworkStatus>, CapabilityError> {
        let (tx, rx) = unbounded();
        self.state().network_watches.push(tx);
        Ok(rx.boxed())
    }
}

#[async_trait]
impl BatteryProvider for MockDevice {
    async fn is_charging(&self) -> Result<Option<bool>, CapabilityError> {
        Ok(self.state().charging)
    }
}

#[async_trait]
impl QrScanner for MockDevice {
    async fn scan(&self) -> Result<Option<String>, CapabilityError> {
        self.state().scans.pop_front().unwrap_or(Ok(None))
    }
}

#[async_trait]
impl MotionProvider for MockDevice {
    async fn watch_orientation(&self) -> Result<EventStream<OrientationSample>, CapabilityError> {
        let (tx, rx) = unbounded();
        self.state().orientation_watches.push(tx);
        Ok(rx.boxed())
    }

    async fn watch_motion(&self) -> Result<EventStream<MotionSample>, CapabilityError> {
        let (tx, rx) = unbounded();
        self.state().motion_watches.push(tx);
        Ok(rx.boxed())
    }
}

#[async_trait]
impl Haptics for MockDevice {
    async fn impact(&self) -> Result<(), CapabilityError> {
        self.state().haptic_pulses += 1;
        Ok(())
    }
}

#[async_trait]
impl PermissionProvider for MockDevice {
    async fn check(&self, capability: Capability) -> Result<PermissionState, CapabilityError> {
        if capability == Capability::Camera && self.state().camera_denied {
            Ok(PermissionState::Denied)
        } else {
            Ok(PermissionState::Granted)
        }
    }

    async fn request(&self, capability: Capability) -> Result<PermissionState, CapabilityError> {
        self.check(capability).await
    }
}
