use crate::application::{
    ChallengeTracker, ChallengeVerifier, GameError, GameSession, RunProgress, TrackerSnapshot,
};
use tokio::sync::watch;

/// A game session plus the live tracker of its current challenge.
///
/// At most one tracker exists at any time: a transition shuts the previous
/// tracker down completely before the next one is spawned.
pub struct GameRuntime {
    session: GameSession,
    tracker: Option<ChallengeTracker>,
    verifier_seed: Option<u64>,
}

impl GameRuntime {
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            tracker: None,
            verifier_seed: None,
        }
    }

    /// Seed the verifiers (lazily picked geo targets become reproducible)
    pub fn with_verifier_seed(mut self, seed: u64) -> Self {
        self.verifier_seed = Some(seed);
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub async fn start(&mut self, name: Option<&str>) -> Result<(), GameError> {
        self.session.start(name).await?;
        self.track_current().await;
        Ok(())
    }

    /// Forward the user action to the live tracker
    pub fn primary_action(&self) -> bool {
        self.tracker
            .as_ref()
            .map(ChallengeTracker::primary_action)
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> Option<TrackerSnapshot> {
        self.tracker.as_ref().map(ChallengeTracker::snapshot)
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<TrackerSnapshot>> {
        self.tracker.as_ref().map(ChallengeTracker::subscribe)
    }

    /// Complete the current challenge once its verifier is done
    pub async fn complete_current(&mut self) -> Result<RunProgress, GameError> {
        if !self.session.is_active() {
            return Err(GameError::NoActiveRun);
        }

        let done = self
            .tracker
            .as_ref()
            .map(ChallengeTracker::is_done)
            .unwrap_or(false);
        if !done {
            return Err(GameError::ChallengeNotDone);
        }

        self.stop_tracker().await;
        let progress = self.session.complete_challenge().await;
        // a failed finish keeps the run on its last challenge
        self.track_current().await;
        progress
    }

    pub async fn skip_current(&mut self) -> Result<RunProgress, GameError> {
        if !self.session.is_active() {
            return Err(GameError::NoActiveRun);
        }

        self.stop_tracker().await;
        let progress = self.session.skip_challenge().await;
        // a failed finish keeps the run on its last challenge
        self.track_current().await;
        progress
    }

    pub async fn abort(&mut self) -> bool {
        self.stop_tracker().await;
        self.session.abort()
    }

    async fn stop_tracker(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.shutdown().await;
        }
    }

    async fn track_current(&mut self) {
        self.stop_tracker().await;

        let Some(challenge) = self.session.current_challenge() else {
            return;
        };

        let verifier = match self.verifier_seed {
            Some(seed) => ChallengeVerifier::with_seed(challenge, seed),
            None => ChallengeVerifier::new(challenge),
        };

        tracing::debug!("Tracking {} challenge", challenge.kind());
        self.tracker = Some(ChallengeTracker::spawn_with_verifier(
            verifier,
            self.session.capabilities().clone(),
            self.session.config().timing,
        ));
    }
}

impl std::fmt::Debug for GameRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRuntime")
            .field("session", &self.session)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
