use crate::domain::StoredScore;
use serde::Serialize;

const PODIUM_SIZE: usize = 3;
const NEXT_RANKS: usize = 4;

/// Ranking view over stored scores, best first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardSummary {
    ranked: Vec<StoredScore>,
    average_points: u32,
}

impl LeaderboardSummary {
    /// Rank `scores` by points. Ties keep their stored (newest-first) order.
    pub fn from_scores(mut scores: Vec<StoredScore>) -> Self {
        scores.sort_by(|a, b| b.points.cmp(&a.points));

        let average_points = if scores.is_empty() {
            0
        } else {
            let total: u64 = scores.iter().map(|s| u64::from(s.points)).sum();
            (total as f64 / scores.len() as f64).round() as u32
        };

        Self {
            ranked: scores,
            average_points,
        }
    }

    /// Places 1-3, `None` where nobody placed yet
    pub fn podium(&self) -> [Option<&StoredScore>; PODIUM_SIZE] {
        std::array::from_fn(|idx| self.ranked.get(idx))
    }

    /// Places 4-7
    pub fn next_ranks(&self) -> [Option<&StoredScore>; NEXT_RANKS] {
        std::array::from_fn(|idx| self.ranked.get(PODIUM_SIZE + idx))
    }

    pub fn ranked(&self) -> &[StoredScore] {
        &self.ranked
    }

    pub fn total_runs(&self) -> usize {
        self.ranked.len()
    }

    pub fn average_points(&self) -> u32 {
        self.average_points
    }

    pub fn has_runs(&self) -> bool {
        !self.ranked.is_empty()
    }
}
