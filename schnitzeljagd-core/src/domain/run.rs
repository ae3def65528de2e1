use crate::domain::{GeoPoint, PlayerName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The run in progress. Owned and mutated by the game session only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRun {
    player_name: PlayerName,
    started_at: DateTime<Utc>,
    challenge_started_at: DateTime<Utc>,

    /// Coordinate the challenges were generated around
    origin: GeoPoint,
    origin_is_fallback: bool,

    current_index: usize,

    /// Completed challenges
    schnitzel: u32,

    /// Challenges completed after their late threshold
    kartoffeln: u32,
}

impl ActiveRun {
    pub fn new(
        player_name: PlayerName,
        origin: GeoPoint,
        origin_is_fallback: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            player_name,
            started_at: now,
            challenge_started_at: now,
            origin,
            origin_is_fallback,
            current_index: 0,
            schnitzel: 0,
            kartoffeln: 0,
        }
    }

    // ===== Getters =====

    pub fn player_name(&self) -> &PlayerName {
        &self.player_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn challenge_started_at(&self) -> DateTime<Utc> {
        self.challenge_started_at
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn origin_is_fallback(&self) -> bool {
        self.origin_is_fallback
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn schnitzel(&self) -> u32 {
        self.schnitzel
    }

    pub fn kartoffeln(&self) -> u32 {
        self.kartoffeln
    }

    // ===== Timing =====

    /// Seconds spent on the current challenge (fractional, never negative)
    pub fn challenge_elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        elapsed_secs(self.challenge_started_at, now)
    }

    /// Whole seconds since the run started
    pub fn run_elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        elapsed_secs(self.started_at, now).floor() as u64
    }

    // ===== Transitions (return updated copies) =====

    /// Count a completed challenge, with a kartoffel when it was late
    pub(crate) fn with_completion(&self, late: bool) -> Self {
        Self {
            schnitzel: self.schnitzel + 1,
            kartoffeln: self.kartoffeln + u32::from(late),
            ..self.clone()
        }
    }

    /// Move to the next challenge and restart its timer
    pub(crate) fn advanced(&self, now: DateTime<Utc>) -> Self {
        Self {
            current_index: self.current_index + 1,
            challenge_started_at: now,
            ..self.clone()
        }
    }
}

fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds().max(0);
    millis as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn run_at(now: DateTime<Utc>) -> ActiveRun {
        ActiveRun::new(
            PlayerName::new("Alice").unwrap(),
            GeoPoint::new(46.948, 7.4474),
            false,
            now,
        )
    }

    #[test]
    fn test_new_run_starts_at_zero() {
        let now = Utc::now();
        let run = run_at(now);

        assert_eq!(run.current_index(), 0);
        assert_eq!(run.schnitzel(), 0);
        assert_eq!(run.kartoffeln(), 0);
        assert_eq!(run.started_at(), now);
        assert_eq!(run.challenge_started_at(), now);
    }

    #[test]
    fn test_completion_counts() {
        let run = run_at(Utc::now());

        let on_time = run.with_completion(false);
        assert_eq!((on_time.schnitzel(), on_time.kartoffeln()), (1, 0));

        let late = on_time.with_completion(true);
        assert_eq!((late.schnitzel(), late.kartoffeln()), (2, 1));

        // Original is untouched
        assert_eq!(run.schnitzel(), 0);
    }

    #[test]
    fn test_advance_resets_challenge_timer() {
        let start = Utc::now();
        let run = run_at(start);
        let later = start + Duration::seconds(42);

        let next = run.advanced(later);
        assert_eq!(next.current_index(), 1);
        assert_eq!(next.challenge_started_at(), later);
        assert_eq!(next.started_at(), start);
        assert_eq!(next.challenge_elapsed_secs(later), 0.0);
        assert_eq!(next.run_elapsed_secs(later), 42);
    }

    #[test]
    fn test_elapsed_never_negative() {
        let start = Utc::now();
        let run = run_at(start);
        assert_eq!(run.challenge_elapsed_secs(start - Duration::seconds(5)), 0.0);
    }

    #[test]
    fn test_elapsed_is_fractional() {
        let start = Utc::now();
        let run = run_at(start);
        let now = start + Duration::milliseconds(1_500);
        assert_eq!(run.challenge_elapsed_secs(now), 1.5);
        assert_eq!(run.run_elapsed_secs(now), 1);
    }
}
