use crate::application::verifier::{
    CapabilityEvent, ChallengeStatus, ChallengeVerifier, VerifierState,
};
use crate::domain::{Challenge, ChallengeKind, GeoPoint};
use crate::traits::{
    Capabilities, Capability, CapabilityError, EventStream, MotionSample, OrientationSample,
};
use futures::StreamExt;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Polling and listening budgets of the trackers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerTiming {
    /// One-shot fixes while looking for the geo target
    pub geo_poll_interval: Duration,
    pub charging_poll_interval: Duration,
    pub charging_max_polls: u32,
    /// How long one orientation/motion listening window stays open
    pub sensor_window: Duration,
}

impl Default for TrackerTiming {
    fn default() -> Self {
        Self {
            geo_poll_interval: Duration::from_secs(1),
            charging_poll_interval: Duration::from_secs(2),
            charging_max_polls: 30,
            sensor_window: Duration::from_secs(12),
        }
    }
}

impl TrackerTiming {
    pub fn with_geo_poll_interval(mut self, interval: Duration) -> Self {
        self.geo_poll_interval = interval;
        self
    }

    pub fn with_charging_polls(mut self, interval: Duration, max_polls: u32) -> Self {
        self.charging_poll_interval = interval;
        self.charging_max_polls = max_polls;
        self
    }

    pub fn with_sensor_window(mut self, window: Duration) -> Self {
        self.sensor_window = window;
        self
    }
}

/// Snapshot of a tracked challenge (cheap to clone)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub kind: ChallengeKind,
    pub state: VerifierState,
    pub status: ChallengeStatus,
    pub target: Option<GeoPoint>,
    pub walked_m: Option<f64>,
}

impl TrackerSnapshot {
    fn of(verifier: &ChallengeVerifier) -> Self {
        Self {
            kind: verifier.kind(),
            state: verifier.state(),
            status: verifier.status().clone(),
            target: verifier.target(),
            walked_m: verifier.walked_m(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == VerifierState::Done
    }
}

#[derive(Debug)]
struct PrimaryAction;

struct Shared {
    verifier: Mutex<ChallengeVerifier>,
    snapshot_tx: watch::Sender<TrackerSnapshot>,
}

impl Shared {
    fn with_verifier<T>(&self, f: impl FnOnce(&mut ChallengeVerifier) -> T) -> T {
        let mut verifier = self
            .verifier
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut verifier)
    }

    /// Feed one event and publish the result. Returns `true` once the
    /// verifier is terminal and the task should stop listening.
    fn apply(&self, event: CapabilityEvent) -> bool {
        let (applied, snapshot) = self.with_verifier(|verifier| {
            let applied = verifier.handle(event);
            (applied, TrackerSnapshot::of(verifier))
        });

        let terminal = snapshot.state.is_terminal();
        if applied {
            let _ = self.snapshot_tx.send(snapshot);
        }
        terminal
    }

    fn abort(&self) {
        let snapshot = self.with_verifier(|verifier| {
            verifier.abort();
            TrackerSnapshot::of(verifier)
        });
        let _ = self.snapshot_tx.send(snapshot);
    }
}

/// Background task that owns every subscription of the active challenge
pub struct ChallengeTracker {
    shared: Arc<Shared>,

    snapshot_rx: watch::Receiver<TrackerSnapshot>,

    action_tx: mpsc::Sender<PrimaryAction>,

    task: Option<JoinHandle<()>>,
}

impl ChallengeTracker {
    /// Spawn a tracker for `challenge` on the current tokio runtime
    pub fn spawn(challenge: &Challenge, capabilities: Capabilities, timing: TrackerTiming) -> Self {
        Self::spawn_with_verifier(ChallengeVerifier::new(challenge), capabilities, timing)
    }

    pub fn spawn_with_verifier(
        verifier: ChallengeVerifier,
        capabilities: Capabilities,
        timing: TrackerTiming,
    ) -> Self {
        let kind = verifier.kind();
        let (snapshot_tx, snapshot_rx) = watch::channel(TrackerSnapshot::of(&verifier));
        let (action_tx, action_rx) = mpsc::channel(8);

        let shared = Arc::new(Shared {
            verifier: Mutex::new(verifier),
            snapshot_tx,
        });

        let task_shared = shared.clone();
        let task = tokio::spawn(async move {
            tracing::debug!("Tracker for {} challenge started", kind);
            let shared = task_shared;
            match kind {
                ChallengeKind::GeoTarget | ChallengeKind::Distance => {
                    track_location(&shared, &capabilities, timing, kind, action_rx).await
                }
                ChallengeKind::Qr => track_qr(&shared, &capabilities, action_rx).await,
                ChallengeKind::Sensor => {
                    track_sensor(&shared, &capabilities, timing, action_rx).await
                }
                ChallengeKind::Charging => {
                    track_charging(&shared, &capabilities, timing, action_rx).await
                }
                ChallengeKind::WifiToggle => {
                    track_network(&shared, &capabilities, action_rx).await
                }
            }
            tracing::debug!("Tracker for {} challenge finished", kind);
        });

        Self {
            shared,
            snapshot_rx,
            action_tx,
            task: Some(task),
        }
    }

    /// Trigger the challenge's user action. Returns `false` when the tracker
    /// no longer listens.
    pub fn primary_action(&self) -> bool {
        self.action_tx.try_send(PrimaryAction).is_ok()
    }

    /// Latest state (always succeeds, never blocks)
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn is_done(&self) -> bool {
        self.shared.with_verifier(|verifier| verifier.is_done())
    }

    /// Mark the verifier aborted and cancel the task. Events already in
    /// flight are ignored from here on.
    pub fn stop(&mut self) {
        self.shared.abort();
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Stop and wait until every subscription of the task is dropped
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ChallengeTracker {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            self.shared.abort();
            task.abort();
        }
    }
}

async fn next_or_pending<T>(stream: &mut Option<EventStream<T>>) -> Option<T> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn track_location(
    shared: &Shared,
    caps: &Capabilities,
    timing: TrackerTiming,
    kind: ChallengeKind,
    mut actions: mpsc::Receiver<PrimaryAction>,
) {
    let mut fixes = match caps.location.watch_position().await {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!("Could not watch position: {}", e);
            if shared.apply(CapabilityEvent::Position(Err(e))) {
                return;
            }
            None
        }
    };

    let polling = kind == ChallengeKind::GeoTarget;
    let mut poll = tokio::time::interval(timing.geo_poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            fix = next_or_pending(&mut fixes) => match fix {
                Some(fix) => {
                    if shared.apply(CapabilityEvent::Position(fix)) {
                        break;
                    }
                }
                None => {
                    tracing::debug!("Position stream ended");
                    fixes = None;
                }
            },
            _ = poll.tick(), if polling => {
                let fix = caps.location.current_position().await;
                if shared.apply(CapabilityEvent::Position(fix)) {
                    break;
                }
            }
            action = actions.recv() => match action {
                Some(_) => {
                    let fix = caps.location.current_position().await;
                    if shared.apply(CapabilityEvent::Position(fix)) {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

async fn track_qr(shared: &Shared, caps: &Capabilities, mut actions: mpsc::Receiver<PrimaryAction>) {
    while actions.recv().await.is_some() {
        let scan = if caps.ensure_permission(Capability::Camera).await {
            caps.scanner.scan().await
        } else {
            Err(CapabilityError::PermissionDenied(Capability::Camera))
        };

        if shared.apply(CapabilityEvent::Scan(scan)) {
            break;
        }
    }
}

async fn track_charging(
    shared: &Shared,
    caps: &Capabilities,
    timing: TrackerTiming,
    mut actions: mpsc::Receiver<PrimaryAction>,
) {
    let mut polls = 0u32;
    let mut ticker = tokio::time::interval(timing.charging_poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick(), if polls < timing.charging_max_polls => {
                polls += 1;
                let reading = caps.battery.is_charging().await;
                if shared.apply(CapabilityEvent::Charging(reading)) {
                    break;
                }
                if polls == timing.charging_max_polls {
                    tracing::debug!("Charging polled {} times, waiting for manual checks", polls);
                }
            }
            action = actions.recv() => match action {
                Some(_) => {
                    let reading = caps.battery.is_charging().await;
                    if shared.apply(CapabilityEvent::Charging(reading)) {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

async fn track_network(
    shared: &Shared,
    caps: &Capabilities,
    mut actions: mpsc::Receiver<PrimaryAction>,
) {
    // the status at challenge start counts as an observation
    if shared.apply(CapabilityEvent::Network(caps.network.status().await)) {
        return;
    }

    let mut changes = match caps.network.watch_status().await {
        Ok(stream) => Some(stream),
        Err(e) => {
            tracing::warn!("Could not watch network status: {}", e);
            shared.apply(CapabilityEvent::Network(Err(e)));
            None
        }
    };

    loop {
        tokio::select! {
            status = next_or_pending(&mut changes) => match status {
                Some(status) => {
                    if shared.apply(CapabilityEvent::Network(Ok(status))) {
                        break;
                    }
                }
                None => {
                    tracing::debug!("Network status stream ended");
                    changes = None;
                }
            },
            action = actions.recv() => match action {
                Some(_) => {
                    if shared.apply(CapabilityEvent::Network(caps.network.status().await)) {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

/// Orientation and motion subscriptions of one listening window
struct SensorListeners {
    orientation: Option<EventStream<OrientationSample>>,
    motion: Option<EventStream<MotionSample>>,
}

impl SensorListeners {
    fn closed() -> Self {
        Self {
            orientation: None,
            motion: None,
        }
    }

    fn is_open(&self) -> bool {
        self.orientation.is_some() || self.motion.is_some()
    }

    async fn open(caps: &Capabilities) -> Result<Self, CapabilityError> {
        if !caps.ensure_permission(Capability::Motion).await {
            return Err(CapabilityError::PermissionDenied(Capability::Motion));
        }

        let orientation = caps.motion.watch_orientation().await?;
        let motion = caps.motion.watch_motion().await?;
        Ok(Self {
            orientation: Some(orientation),
            motion: Some(motion),
        })
    }
}

async fn track_sensor(
    shared: &Shared,
    caps: &Capabilities,
    timing: TrackerTiming,
    mut actions: mpsc::Receiver<PrimaryAction>,
) {
    let mut listeners = SensorListeners::closed();
    let window = tokio::time::sleep(timing.sensor_window);
    tokio::pin!(window);

    let mut open_requested = true;

    loop {
        if open_requested {
            open_requested = false;
            match SensorListeners::open(caps).await {
                Ok(opened) => {
                    listeners = opened;
                    window.as_mut().reset(Instant::now() + timing.sensor_window);
                    if shared.apply(CapabilityEvent::SensorWindowOpened) {
                        break;
                    }
                }
                Err(e) => {
                    if shared.apply(CapabilityEvent::SensorUnavailable(e)) {
                        break;
                    }
                }
            }
        }

        let listening = listeners.is_open();

        tokio::select! {
            sample = next_or_pending(&mut listeners.orientation) => match sample {
                Some(sample) => {
                    if shared.apply(CapabilityEvent::Orientation(sample)) {
                        break;
                    }
                }
                None => listeners.orientation = None,
            },
            sample = next_or_pending(&mut listeners.motion) => match sample {
                Some(sample) => {
                    if shared.apply(CapabilityEvent::Motion(sample)) {
                        break;
                    }
                }
                None => listeners.motion = None,
            },
            _ = &mut window, if listening => {
                tracing::debug!("Sensor window of {:?} expired", timing.sensor_window);
                listeners = SensorListeners::closed();
                if shared.apply(CapabilityEvent::SensorWindowClosed) {
                    break;
                }
            }
            action = actions.recv() => match action {
                Some(_) if listeners.is_open() => {
                    tracing::debug!("Sensor window already open");
                }
                Some(_) => open_requested = true,
                None => break,
            },
        }
    }
}
