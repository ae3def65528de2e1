pub mod capability;
pub mod store;

pub use capability::{
    BatteryProvider, Capabilities, Capability, CapabilityError, EventStream, Haptics,
    LocationProvider, MotionProvider, MotionSample, NetworkProvider, NetworkStatus,
    OrientationSample, PermissionProvider, PermissionState, QrScanner, Unsupported,
};
pub use store::{LeaderboardClient, LeaderboardError, ResultStore, StoreError};
