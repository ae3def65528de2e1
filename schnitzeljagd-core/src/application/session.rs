use crate::application::{GameConfig, GameError};
use crate::domain::{
    ActiveRun, Challenge, ChallengeCatalog, Clock, GeoPoint, LeaderboardSummary, PlayerName,
    PlayerNameError, RunEvent, RunResult, StoredScore, SystemClock,
};
use crate::infrastructure::NoopLeaderboard;
use crate::traits::{Capabilities, Capability, LeaderboardClient, ResultStore, StoreError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification hook fired after every committed run transition
pub type EventHook = Box<dyn FnMut(&RunEvent) + Send>;

/// What a complete or skip did to the run
#[derive(Debug, Clone, PartialEq)]
pub enum RunProgress {
    /// There was no active run; nothing happened
    Idle,

    /// Moved on to the challenge at `index`
    Advanced { index: usize },

    Finished(RunResult),
}

/// Owns the single active run and drives it from start to finish.
///
/// State: `idle → active → {active | finished | aborted}`. Every mutating
/// operation computes the next run on a copy and commits it only after
/// persistence succeeded.
pub struct GameSession {
    config: GameConfig,
    catalog: ChallengeCatalog,
    capabilities: Capabilities,
    store: Arc<dyn ResultStore>,
    leaderboard: Arc<dyn LeaderboardClient>,
    clock: Arc<dyn Clock>,
    rng: StdRng,

    /// Remembered across runs
    player_name: Option<PlayerName>,

    challenges: Vec<Challenge>,
    active_run: Option<ActiveRun>,
    last_result: Option<RunResult>,

    hook: Option<EventHook>,
}

impl GameSession {
    pub fn new(config: GameConfig, capabilities: Capabilities, store: Arc<dyn ResultStore>) -> Self {
        let catalog = ChallengeCatalog::new(config.catalog.clone());
        Self {
            config,
            catalog,
            capabilities,
            store,
            leaderboard: Arc::new(NoopLeaderboard),
            clock: Arc::new(SystemClock),
            rng: StdRng::from_os_rng(),
            player_name: None,
            challenges: Vec::new(),
            active_run: None,
            last_result: None,
            hook: None,
        }
    }

    pub fn with_leaderboard(mut self, leaderboard: Arc<dyn LeaderboardClient>) -> Self {
        self.leaderboard = leaderboard;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Make challenge generation reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn on_event(mut self, hook: impl FnMut(&RunEvent) + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    // ===== Queries =====

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn active_run(&self) -> Option<&ActiveRun> {
        self.active_run.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active_run.is_some()
    }

    /// Challenges of the current (or last) run
    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.active_run
            .as_ref()
            .and_then(|run| self.challenges.get(run.current_index()))
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// Remembered name, if one was ever set
    pub fn player_name(&self) -> Option<&PlayerName> {
        self.player_name.as_ref()
    }

    pub fn set_player_name(&mut self, name: &str) -> Result<(), PlayerNameError> {
        self.player_name = Some(PlayerName::new(name)?);
        Ok(())
    }

    pub async fn ensure_permission(&self, capability: Capability) -> bool {
        self.capabilities.ensure_permission(capability).await
    }

    pub async fn scores(&self) -> Result<Vec<StoredScore>, StoreError> {
        self.store.get_runs().await
    }

    pub async fn leaderboard(&self) -> Result<LeaderboardSummary, StoreError> {
        Ok(LeaderboardSummary::from_scores(self.store.get_runs().await?))
    }

    pub async fn clear_scores(&self) -> Result<(), StoreError> {
        self.store.clear_runs().await
    }

    // ===== Transitions =====

    /// Start a run. The name falls back to the remembered one, then to
    /// the default player name.
    pub async fn start(&mut self, name: Option<&str>) -> Result<(), GameError> {
        if self.active_run.is_some() {
            return Err(GameError::RunAlreadyActive);
        }

        let player_name = match name {
            Some(name) => PlayerName::new(name)?,
            None => self.player_name.clone().unwrap_or_default(),
        };

        let (origin, origin_is_fallback) = self.locate_origin().await;
        let challenges = self.catalog.build(origin, &mut self.rng);
        let run = ActiveRun::new(player_name.clone(), origin, origin_is_fallback, self.clock.now());

        info!(
            "Run started for {} with {} challenges around {}",
            player_name,
            challenges.len(),
            origin
        );

        let event = RunEvent::RunStarted {
            player_name: player_name.to_string(),
            challenge_count: challenges.len(),
            origin_is_fallback,
        };

        self.player_name = Some(player_name);
        self.challenges = challenges;
        self.last_result = None;
        self.active_run = Some(run);
        self.emit(event);
        Ok(())
    }

    /// Count the current challenge as done. No-op without an active run.
    pub async fn complete_challenge(&mut self) -> Result<RunProgress, GameError> {
        let Some(run) = self.active_run.clone() else {
            debug!("complete_challenge without an active run");
            return Ok(RunProgress::Idle);
        };

        let now = self.clock.now();
        let index = run.current_index();
        let Some(challenge) = self.challenges.get(index) else {
            return self.finish(&run).await.map(RunProgress::Finished);
        };

        let kind = challenge.kind();
        let late = challenge.is_late(run.challenge_elapsed_secs(now));
        let completed = run.with_completion(late);

        self.pulse().await;

        let progress = if index + 1 >= self.challenges.len() {
            RunProgress::Finished(self.finish(&completed).await?)
        } else {
            self.active_run = Some(completed.advanced(now));
            RunProgress::Advanced { index: index + 1 }
        };

        info!("Challenge {} ({}) completed, late: {}", index, kind, late);
        self.emit(RunEvent::ChallengeCompleted { index, kind, late });
        self.emit_finished(&progress);
        Ok(progress)
    }

    /// Move past the current challenge without counting it. No-op without
    /// an active run.
    pub async fn skip_challenge(&mut self) -> Result<RunProgress, GameError> {
        let Some(run) = self.active_run.clone() else {
            debug!("skip_challenge without an active run");
            return Ok(RunProgress::Idle);
        };

        let index = run.current_index();
        let kind = self.challenges.get(index).map(Challenge::kind);

        let progress = if index + 1 >= self.challenges.len() {
            RunProgress::Finished(self.finish(&run).await?)
        } else {
            self.active_run = Some(run.advanced(self.clock.now()));
            RunProgress::Advanced { index: index + 1 }
        };

        if let Some(kind) = kind {
            info!("Challenge {} ({}) skipped", index, kind);
            self.emit(RunEvent::ChallengeSkipped { index, kind });
        }
        self.emit_finished(&progress);
        Ok(progress)
    }

    /// Discard the active run without a result. Returns `false` when idle.
    pub fn abort(&mut self) -> bool {
        match self.active_run.take() {
            Some(run) => {
                info!("Run aborted at challenge {}", run.current_index());
                self.emit(RunEvent::RunAborted {
                    index: run.current_index(),
                });
                true
            }
            None => false,
        }
    }

    async fn finish(&mut self, run: &ActiveRun) -> Result<RunResult, GameError> {
        let result = RunResult::from_run(run, &self.config.scoring, self.clock.now());

        self.store.save_run(StoredScore::from(&result)).await?;

        if let Err(e) = self.leaderboard.submit(&result).await {
            warn!("Leaderboard submission of run {} failed: {}", result.id, e);
        }

        info!(
            "Run finished for {}: {} points ({} schnitzel, {} kartoffeln, {}s)",
            result.name, result.points, result.schnitzel, result.kartoffeln, result.duration_seconds
        );

        self.last_result = Some(result.clone());
        self.active_run = None;
        Ok(result)
    }

    async fn pulse(&self) {
        if let Err(e) = self.capabilities.haptics.impact().await {
            debug!("Haptic feedback unavailable: {}", e);
        }
    }

    async fn locate_origin(&self) -> (GeoPoint, bool) {
        let fallback = self.config.default_origin;

        if !self.capabilities.ensure_permission(Capability::Location).await {
            warn!("No location permission, using fallback origin {}", fallback);
            return (fallback, true);
        }

        match tokio::time::timeout(
            self.config.location_timeout,
            self.capabilities.location.current_position(),
        )
        .await
        {
            Ok(Ok(origin)) => (origin, false),
            Ok(Err(e)) => {
                warn!("No position fix ({}), using fallback origin {}", e, fallback);
                (fallback, true)
            }
            Err(_) => {
                warn!(
                    "No position fix within {:?}, using fallback origin {}",
                    self.config.location_timeout, fallback
                );
                (fallback, true)
            }
        }
    }

    fn emit(&mut self, event: RunEvent) {
        if let Some(hook) = self.hook.as_mut() {
            hook(&event);
        }
    }

    fn emit_finished(&mut self, progress: &RunProgress) {
        if let RunProgress::Finished(result) = progress {
            self.emit(RunEvent::RunFinished {
                result: result.clone(),
            });
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("player_name", &self.player_name)
            .field("active_run", &self.active_run)
            .field("last_result", &self.last_result)
            .finish_non_exhaustive()
    }
}
