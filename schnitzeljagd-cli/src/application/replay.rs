//! Scripted runs: a scenario file drives a [`ScriptedDevice`] step by step
//! through a complete game session.

use crate::infrastructure::{CliError, Result, ScriptedDevice};
use chrono::Utc;
use schemars::JsonSchema;
use schnitzeljagd_core::domain::geo::EARTH_RADIUS_M;
use schnitzeljagd_core::traits::Capability;
use schnitzeljagd_core::{
    GameConfig, GameRuntime, GameSession, GeoPoint, LeaderboardClient, ManualClock,
    NoopLeaderboard, ResultStore, RunEvent, RunResult, TrackerSnapshot, TrackerTiming,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pause after every step so trackers can pick up the change
const SETTLE: Duration = Duration::from_millis(50);

/// How long `complete` waits for the current challenge to be verified
const COMPLETE_WAIT: Duration = Duration::from_secs(3);

fn default_connected() -> bool {
    true
}

/// A replayable run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scenario {
    /// Player name; the command line may override it
    #[serde(default)]
    pub name: Option<String>,

    /// Initial position. Without one the run starts at the fallback origin.
    #[serde(default)]
    pub start: Option<GeoPoint>,

    #[serde(default = "default_connected")]
    pub connected: bool,

    #[serde(default)]
    pub charging: Option<bool>,

    /// Include the sensor challenge
    #[serde(default)]
    pub with_sensor: bool,

    /// Seeds challenge generation
    #[serde(default)]
    pub seed: Option<u64>,

    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "do", rename_all = "snake_case")]
pub enum Step {
    /// Let scenario time pass (counts toward lateness and run duration)
    Wait { secs: u32 },
    MoveTo { lat: f64, lng: f64 },
    /// Walk north from the current position
    Walk { meters: f64 },
    /// Jump onto the current geo target
    ReachTarget,
    /// Queue a scan result and trigger the scan
    Scan {
        #[serde(default)]
        payload: Option<String>,
    },
    Charging { charging: bool },
    Network { connected: bool },
    Tilt { beta: f64 },
    Shake { magnitude: f64 },
    /// Refuse the permission for a capability from now on
    Deny { capability: Capability },
    /// The device stops reporting orientation and motion
    SensorsOff,
    /// Trigger the challenge's primary action
    Primary,
    /// Wait for the current challenge to be verified and complete it
    Complete,
    Skip,
    Abort,
}

impl Scenario {
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CliError::scenario_not_found(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// What a replay produced
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    /// `None` when the scenario ended without finishing the run
    pub result: Option<RunResult>,
    pub events: Vec<RunEvent>,
    pub haptic_pulses: u32,
}

/// Runs a [`Scenario`] against a fresh game session
pub struct Replay {
    scenario: Scenario,
    store: Arc<dyn ResultStore>,
    leaderboard: Arc<dyn LeaderboardClient>,
    config: GameConfig,
}

impl Replay {
    pub fn new(scenario: Scenario, store: Arc<dyn ResultStore>) -> Self {
        let timing = TrackerTiming::default()
            .with_geo_poll_interval(Duration::from_millis(100))
            .with_charging_polls(Duration::from_millis(100), 30);
        let config = GameConfig::default()
            .with_location_timeout(Duration::from_secs(1))
            .with_timing(timing);

        Self {
            scenario,
            store,
            leaderboard: Arc::new(NoopLeaderboard),
            config,
        }
    }

    pub fn with_leaderboard(mut self, leaderboard: Arc<dyn LeaderboardClient>) -> Self {
        self.leaderboard = leaderboard;
        self
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    #[instrument(skip(self), fields(steps = self.scenario.steps.len()))]
    pub async fn run(self, name: Option<&str>) -> Result<ReplayOutcome> {
        let scenario = self.scenario;
        let device = ScriptedDevice::new(scenario.start, scenario.connected, scenario.charging);
        let clock = ManualClock::new(Utc::now());

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        let mut config = self.config;
        config.catalog.include_sensor = scenario.with_sensor;

        let mut session = GameSession::new(config, device.capabilities(), self.store)
            .with_leaderboard(self.leaderboard)
            .with_clock(Arc::new(clock.clone()))
            .on_event(move |event| {
                sink.lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(event.clone())
            });
        let mut runtime = match scenario.seed {
            Some(seed) => {
                session = session.with_seed(seed);
                GameRuntime::new(session).with_verifier_seed(seed)
            }
            None => GameRuntime::new(session),
        };

        let name = name.or(scenario.name.as_deref());
        runtime.start(name).await?;
        tokio::time::sleep(SETTLE).await;

        let mut player = Player {
            runtime: &mut runtime,
            device: &device,
            clock: &clock,
        };
        for (index, step) in scenario.steps.iter().enumerate() {
            player.apply(index + 1, step).await?;
            tokio::time::sleep(SETTLE).await;
        }

        if runtime.session().is_active() {
            warn!("Scenario ended with the run still active, aborting it");
            runtime.abort().await;
        }

        let result = runtime.session().last_result().cloned();
        if let Some(result) = &result {
            info!(points = result.points, "Replay finished");
        }

        let events = events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        Ok(ReplayOutcome {
            result,
            events,
            haptic_pulses: device.haptic_pulses(),
        })
    }
}

struct Player<'a> {
    runtime: &'a mut GameRuntime,
    device: &'a ScriptedDevice,
    clock: &'a ManualClock,
}

impl Player<'_> {
    async fn apply(&mut self, index: usize, step: &Step) -> Result<()> {
        debug!(step = index, "{:?}", step);

        match step {
            Step::Wait { secs } => self.clock.advance_secs(i64::from(*secs)),
            Step::MoveTo { lat, lng } => self.device.move_to(GeoPoint::new(*lat, *lng)),
            Step::Walk { meters } => {
                let from = self
                    .device
                    .position()
                    .ok_or_else(|| CliError::step(index, "no position to walk from"))?;
                let degrees = (meters / EARTH_RADIUS_M).to_degrees();
                self.device.move_to(GeoPoint::new(from.lat + degrees, from.lng));
            }
            Step::ReachTarget => {
                let target = self
                    .runtime
                    .snapshot()
                    .and_then(|snapshot| snapshot.target)
                    .ok_or_else(|| CliError::step(index, "current challenge has no target"))?;
                self.device.move_to(target);
            }
            Step::Scan { payload } => {
                self.device.queue_scan(payload.clone());
                self.primary(index)?;
            }
            Step::Charging { charging } => self.device.set_charging(Some(*charging)),
            Step::Network { connected } => self.device.set_connected(*connected),
            Step::Tilt { beta } => self.device.tilt(*beta),
            Step::Shake { magnitude } => self.device.shake(*magnitude),
            Step::Deny { capability } => self.device.deny(*capability),
            Step::SensorsOff => self.device.set_motion_sensors(false),
            Step::Primary => self.primary(index)?,
            Step::Complete => {
                self.wait_done(index).await?;
                self.runtime.complete_current().await?;
            }
            Step::Skip => {
                self.runtime.skip_current().await?;
            }
            Step::Abort => {
                self.runtime.abort().await;
            }
        }

        Ok(())
    }

    fn primary(&self, index: usize) -> Result<()> {
        if self.runtime.primary_action() {
            Ok(())
        } else {
            Err(CliError::step(index, "no challenge to act on"))
        }
    }

    async fn wait_done(&self, index: usize) -> Result<()> {
        let mut rx = self
            .runtime
            .subscribe()
            .ok_or_else(|| CliError::step(index, "no active challenge"))?;

        let waited = tokio::time::timeout(COMPLETE_WAIT, rx.wait_for(TrackerSnapshot::is_done))
            .await
            .map(|done| done.map(|_| ()));

        match waited {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(CliError::step(index, "challenge tracker stopped")),
            Err(_) => {
                let status = rx.borrow().status.clone();
                Err(CliError::step(
                    index,
                    format!("challenge not done: {}", status),
                ))
            }
        }
    }
}
