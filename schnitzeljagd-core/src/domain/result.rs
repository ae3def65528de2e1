use crate::domain::ActiveRun;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Points per completed challenge
pub const BONUS_PER_SCHNITZEL: u32 = 100;

/// Points lost per late completion
pub const MALUS_PER_KARTOFFEL: u32 = 20;

/// Point values used when a run finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoring {
    pub bonus_per_schnitzel: u32,
    pub malus_per_kartoffel: u32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            bonus_per_schnitzel: BONUS_PER_SCHNITZEL,
            malus_per_kartoffel: MALUS_PER_KARTOFFEL,
        }
    }
}

impl Scoring {
    pub fn bonus(&self, schnitzel: u32) -> u32 {
        schnitzel.saturating_mul(self.bonus_per_schnitzel)
    }

    pub fn malus(&self, kartoffeln: u32) -> u32 {
        kartoffeln.saturating_mul(self.malus_per_kartoffel)
    }

    /// `max(0, bonus - malus)`
    pub fn points(&self, schnitzel: u32, kartoffeln: u32) -> u32 {
        self.bonus(schnitzel).saturating_sub(self.malus(kartoffeln))
    }
}

/// Outcome of a finished run. This is also the leaderboard submission body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub id: Uuid,
    pub name: String,

    #[serde(rename = "dateIso")]
    pub completed_at: DateTime<Utc>,

    pub schnitzel: u32,
    pub kartoffeln: u32,

    pub duration_seconds: u64,
    pub schnitzel_bonus: u32,
    pub kartoffel_malus: u32,
    pub points: u32,
}

impl RunResult {
    /// Score `run` as finished at `now`
    pub fn from_run(run: &ActiveRun, scoring: &Scoring, now: DateTime<Utc>) -> Self {
        let schnitzel = run.schnitzel();
        let kartoffeln = run.kartoffeln();

        Self {
            id: Uuid::new_v4(),
            name: run.player_name().to_string(),
            completed_at: now,
            schnitzel,
            kartoffeln,
            duration_seconds: run.run_elapsed_secs(now),
            schnitzel_bonus: scoring.bonus(schnitzel),
            kartoffel_malus: scoring.malus(kartoffeln),
            points: scoring.points(schnitzel, kartoffeln),
        }
    }
}

/// What the local result store keeps per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoredScore {
    pub name: String,

    #[serde(rename = "dateIso")]
    pub completed_at: DateTime<Utc>,

    pub points: u32,
}

impl From<&RunResult> for StoredScore {
    fn from(result: &RunResult) -> Self {
        Self {
            name: result.name.clone(),
            completed_at: result.completed_at,
            points: result.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, PlayerName};
    use chrono::Duration;

    #[test]
    fn test_points_formula() {
        let scoring = Scoring::default();
        assert_eq!(scoring.points(5, 0), 500);
        assert_eq!(scoring.points(5, 1), 480);
        assert_eq!(scoring.points(0, 0), 0);
    }

    #[test]
    fn test_points_never_negative() {
        let scoring = Scoring::default();
        assert_eq!(scoring.points(1, 6), 0);
        assert_eq!(scoring.points(0, 3), 0);

        let harsh = Scoring {
            bonus_per_schnitzel: 10,
            malus_per_kartoffel: 1_000,
        };
        assert_eq!(harsh.points(3, 1), 0);
    }

    #[test]
    fn test_result_from_run() {
        let start = Utc::now();
        let run = ActiveRun::new(
            PlayerName::new("Alice").unwrap(),
            GeoPoint::new(0.0, 0.0),
            true,
            start,
        )
        .with_completion(false)
        .with_completion(true);
        let finished_at = start + Duration::milliseconds(95_900);

        let result = RunResult::from_run(&run, &Scoring::default(), finished_at);

        assert_eq!(result.name, "Alice");
        assert_eq!(result.schnitzel, 2);
        assert_eq!(result.kartoffeln, 1);
        assert_eq!(result.schnitzel_bonus, 200);
        assert_eq!(result.kartoffel_malus, 20);
        assert_eq!(result.points, 180);
        assert_eq!(result.duration_seconds, 95);
        assert_eq!(result.completed_at, finished_at);
    }

    #[test]
    fn test_result_ids_are_unique() {
        let run = ActiveRun::new(
            PlayerName::default(),
            GeoPoint::new(0.0, 0.0),
            true,
            Utc::now(),
        );
        let a = RunResult::from_run(&run, &Scoring::default(), Utc::now());
        let b = RunResult::from_run(&run, &Scoring::default(), Utc::now());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let run = ActiveRun::new(
            PlayerName::default(),
            GeoPoint::new(0.0, 0.0),
            true,
            Utc::now(),
        );
        let result = RunResult::from_run(&run, &Scoring::default(), Utc::now());
        let json = serde_json::to_value(&result).unwrap();

        for key in [
            "id",
            "name",
            "dateIso",
            "schnitzel",
            "kartoffeln",
            "durationSeconds",
            "schnitzelBonus",
            "kartoffelMalus",
            "points",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_stored_score_keeps_name_date_points() {
        let run = ActiveRun::new(
            PlayerName::new("Bob").unwrap(),
            GeoPoint::new(0.0, 0.0),
            false,
            Utc::now(),
        )
        .with_completion(false);
        let result = RunResult::from_run(&run, &Scoring::default(), Utc::now());

        let stored = StoredScore::from(&result);
        assert_eq!(stored.name, "Bob");
        assert_eq!(stored.points, 100);
        assert_eq!(stored.completed_at, result.completed_at);

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
