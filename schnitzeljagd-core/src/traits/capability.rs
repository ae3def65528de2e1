//! Device capabilities the game consumes. Drivers live outside this crate;
//! tests and the CLI plug in scripted implementations.

use crate::domain::GeoPoint;
use async_trait::async_trait;
use futures::stream::BoxStream;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Live event subscription. Dropping the stream unsubscribes.
pub type EventStream<T> = BoxStream<'static, T>;

/// Capabilities that are guarded by a user permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Location,
    Camera,
    Motion,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Location => write!(f, "location"),
            Capability::Camera => write!(f, "camera"),
            Capability::Motion => write!(f, "motion"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not decided yet, a request will ask the user
    Prompt,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("Capability unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied for {0}")]
    PermissionDenied(Capability),

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Timed out")]
    Timeout,

    #[error("Capability failed: {0}")]
    Failed(String),
}

/// Connectivity as reported by the network capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub connected: bool,
}

impl NetworkStatus {
    pub fn connected() -> Self {
        Self { connected: true }
    }

    pub fn disconnected() -> Self {
        Self { connected: false }
    }
}

/// Device orientation in degrees (`beta` front/back tilt in [-180, 180],
/// `gamma` left/right tilt in [-90, 90])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub beta: f64,
    pub gamma: f64,
}

/// Acceleration including gravity, m/s²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// One-shot position fix
    async fn current_position(&self) -> Result<GeoPoint, CapabilityError>;

    /// Continuous fixes; per-fix failures arrive as `Err` items
    async fn watch_position(
        &self,
    ) -> Result<EventStream<Result<GeoPoint, CapabilityError>>, CapabilityError>;
}

#[async_trait]
pub trait NetworkProvider: Send + Sync {
    async fn status(&self) -> Result<NetworkStatus, CapabilityError>;

    async fn watch_status(&self) -> Result<EventStream<NetworkStatus>, CapabilityError>;
}

#[async_trait]
pub trait BatteryProvider: Send + Sync {
    /// `Ok(None)` when the platform cannot tell
    async fn is_charging(&self) -> Result<Option<bool>, CapabilityError>;
}

#[async_trait]
pub trait QrScanner: Send + Sync {
    /// Scan a single code. `Ok(None)` when nothing was decoded.
    async fn scan(&self) -> Result<Option<String>, CapabilityError>;
}

#[async_trait]
pub trait MotionProvider: Send + Sync {
    async fn watch_orientation(&self) -> Result<EventStream<OrientationSample>, CapabilityError>;

    async fn watch_motion(&self) -> Result<EventStream<MotionSample>, CapabilityError>;
}

#[async_trait]
pub trait Haptics: Send + Sync {
    /// Short feedback pulse. Callers ignore failures.
    async fn impact(&self) -> Result<(), CapabilityError>;
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn check(&self, capability: Capability) -> Result<PermissionState, CapabilityError>;

    async fn request(&self, capability: Capability) -> Result<PermissionState, CapabilityError>;
}

/// Stand-in for every capability on a device that has none of them
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

fn unsupported(what: &str) -> CapabilityError {
    CapabilityError::Unavailable(format!("{} not supported on this device", what))
}

#[async_trait]
impl LocationProvider for Unsupported {
    async fn current_position(&self) -> Result<GeoPoint, CapabilityError> {
        Err(unsupported("location"))
    }

    async fn watch_position(
        &self,
    ) -> Result<EventStream<Result<GeoPoint, CapabilityError>>, CapabilityError> {
        Err(unsupported("location"))
    }
}

#[async_trait]
impl NetworkProvider for Unsupported {
    async fn status(&self) -> Result<NetworkStatus, CapabilityError> {
        Err(unsupported("network status"))
    }

    async fn watch_status(&self) -> Result<EventStream<NetworkStatus>, CapabilityError> {
        Err(unsupported("network status"))
    }
}

#[async_trait]
impl BatteryProvider for Unsupported {
    async fn is_charging(&self) -> Result<Option<bool>, CapabilityError> {
        Ok(None)
    }
}

#[async_trait]
impl QrScanner for Unsupported {
    async fn scan(&self) -> Result<Option<String>, CapabilityError> {
        Err(unsupported("barcode scanning"))
    }
}

#[async_trait]
impl MotionProvider for Unsupported {
    async fn watch_orientation(&self) -> Result<EventStream<OrientationSample>, CapabilityError> {
        Err(unsupported("orientation"))
    }

    async fn watch_motion(&self) -> Result<EventStream<MotionSample>, CapabilityError> {
        Err(unsupported("motion"))
    }
}

#[async_trait]
impl Haptics for Unsupported {
    async fn impact(&self) -> Result<(), CapabilityError> {
        Err(unsupported("haptics"))
    }
}

#[async_trait]
impl PermissionProvider for Unsupported {
    async fn check(&self, _capability: Capability) -> Result<PermissionState, CapabilityError> {
        Ok(PermissionState::Granted)
    }

    async fn request(&self, _capability: Capability) -> Result<PermissionState, CapabilityError> {
        Ok(PermissionState::Granted)
    }
}

/// Every capability provider the game talks to
#[derive(Clone)]
pub struct Capabilities {
    pub location: Arc<dyn LocationProvider>,
    pub network: Arc<dyn NetworkProvider>,
    pub battery: Arc<dyn BatteryProvider>,
    pub scanner: Arc<dyn QrScanner>,
    pub motion: Arc<dyn MotionProvider>,
    pub haptics: Arc<dyn Haptics>,
    pub permissions: Arc<dyn PermissionProvider>,
}

impl Capabilities {
    /// All providers report "unavailable"; permissions are granted
    pub fn unsupported() -> Self {
        let none = Arc::new(Unsupported);
        Self {
            location: none.clone(),
            network: none.clone(),
            battery: none.clone(),
            scanner: none.clone(),
            motion: none.clone(),
            haptics: none.clone(),
            permissions: none,
        }
    }

    pub fn with_location(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.location = provider;
        self
    }

    pub fn with_network(mut self, provider: Arc<dyn NetworkProvider>) -> Self {
        self.network = provider;
        self
    }

    pub fn with_battery(mut self, provider: Arc<dyn BatteryProvider>) -> Self {
        self.battery = provider;
        self
    }

    pub fn with_scanner(mut self, provider: Arc<dyn QrScanner>) -> Self {
        self.scanner = provider;
        self
    }

    pub fn with_motion(mut self, provider: Arc<dyn MotionProvider>) -> Self {
        self.motion = provider;
        self
    }

    pub fn with_haptics(mut self, provider: Arc<dyn Haptics>) -> Self {
        self.haptics = provider;
        self
    }

    pub fn with_permissions(mut self, provider: Arc<dyn PermissionProvider>) -> Self {
        self.permissions = provider;
        self
    }

    /// Check a permission and ask for it when it is not granted yet.
    /// Provider errors count as "not granted".
    pub async fn ensure_permission(&self, capability: Capability) -> bool {
        let state = match self.permissions.check(capability).await {
            Ok(PermissionState::Granted) => return true,
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Checking {} permission failed: {}", capability, e);
                return false;
            }
        };

        if state == PermissionState::Denied {
            tracing::debug!("{} permission denied earlier, asking again", capability);
        }

        match self.permissions.request(capability).await {
            Ok(PermissionState::Granted) => true,
            Ok(_) => {
                tracing::warn!("{} permission denied", capability);
                false
            }
            Err(e) => {
                tracing::warn!("Requesting {} permission failed: {}", capability, e);
                false
            }
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedPermissions {
        checked: PermissionState,
        requested: Result<PermissionState, CapabilityError>,
        requests: Mutex<u32>,
    }

    #[async_trait]
    impl PermissionProvider for FixedPermissions {
        async fn check(&self, _c: Capability) -> Result<PermissionState, CapabilityError> {
            Ok(self.checked)
        }

        async fn request(&self, _c: Capability) -> Result<PermissionState, CapabilityError> {
            *self.requests.lock().unwrap() += 1;
            self.requested.clone()
        }
    }

    fn with_permissions(
        checked: PermissionState,
        requested: Result<PermissionState, CapabilityError>,
    ) -> (Capabilities, Arc<FixedPermissions>) {
        let perms = Arc::new(FixedPermissions {
            checked,
            requested,
            requests: Mutex::new(0),
        });
        (
            Capabilities::unsupported().with_permissions(perms.clone()),
            perms,
        )
    }

    #[tokio::test]
    async fn test_granted_permission_skips_request() {
        let (caps, perms) = with_permissions(PermissionState::Granted, Ok(PermissionState::Denied));
        assert!(caps.ensure_permission(Capability::Camera).await);
        assert_eq!(*perms.requests.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prompt_then_granted() {
        let (caps, perms) = with_permissions(PermissionState::Prompt, Ok(PermissionState::Granted));
        assert!(caps.ensure_permission(Capability::Location).await);
        assert_eq!(*perms.requests.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_denied_is_false_not_error() {
        let (caps, _) = with_permissions(PermissionState::Prompt, Ok(PermissionState::Denied));
        assert!(!caps.ensure_permission(Capability::Camera).await);

        let (caps, _) = with_permissions(
            PermissionState::Prompt,
            Err(CapabilityError::Failed("boom".to_string())),
        );
        assert!(!caps.ensure_permission(Capability::Camera).await);
    }

    #[tokio::test]
    async fn test_unsupported_reports_unavailable() {
        let caps = Capabilities::unsupported();
        assert!(matches!(
            caps.location.current_position().await,
            Err(CapabilityError::Unavailable(_))
        ));
        assert_eq!(caps.battery.is_charging().await, Ok(None));
    }

    #[test]
    fn test_motion_magnitude() {
        let sample = MotionSample {
            x: 3.0,
            y: 4.0,
            z: 12.0,
        };
        assert_eq!(sample.magnitude(), 13.0);
    }
}
