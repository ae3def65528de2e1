use super::{ChallengeStatus, Verdict};
use crate::domain::{random_point_within_radius, GeoPoint};
use crate::traits::CapabilityError;
use rand::rngs::StdRng;

/// Radius used when the target has to be picked from the first fix
pub const LAZY_TARGET_RADIUS_M: f64 = 2_000.0;

pub(crate) struct GeoTargetCheck {
    target: Option<GeoPoint>,
    radius_m: f64,
    rng: StdRng,
}

impl GeoTargetCheck {
    pub fn new(target: Option<GeoPoint>, radius_m: f64, rng: StdRng) -> Self {
        Self {
            target,
            radius_m,
            rng,
        }
    }

    pub fn target(&self) -> Option<GeoPoint> {
        self.target
    }

    pub fn on_position(&mut self, fix: &Result<GeoPoint, CapabilityError>) -> Verdict {
        let position = match fix {
            Ok(position) => *position,
            Err(e) => {
                tracing::debug!("No position fix: {}", e);
                return Verdict::Pending(ChallengeStatus::LocationUnavailable);
            }
        };

        let target = match self.target {
            Some(target) => target,
            None => {
                let target = random_point_within_radius(
                    &mut self.rng,
                    position.lat,
                    position.lng,
                    LAZY_TARGET_RADIUS_M,
                );
                tracing::info!("Picked geo target {} from first fix {}", target, position);
                self.target = Some(target);
                target
            }
        };

        let distance = position.distance_to(&target);
        if distance <= self.radius_m {
            Verdict::Done(ChallengeStatus::TargetReached)
        } else {
            Verdict::Pending(ChallengeStatus::DistanceToTarget {
                meters: distance.round() as u64,
            })
        }
    }
}

/// Sums the distance between consecutive fixes
pub(crate) struct DistanceCheck {
    goal_m: u32,
    last: Option<GeoPoint>,
    walked_m: f64,
}

impl DistanceCheck {
    pub fn new(goal_m: u32) -> Self {
        Self {
            goal_m,
            last: None,
            walked_m: 0.0,
        }
    }

    pub fn walked_m(&self) -> f64 {
        self.walked_m
    }

    pub fn on_position(&mut self, fix: &Result<GeoPoint, CapabilityError>) -> Verdict {
        let position = match fix {
            Ok(position) => *position,
            Err(e) => {
                tracing::debug!("No position fix: {}", e);
                return Verdict::Pending(ChallengeStatus::LocationUnavailable);
            }
        };

        if let Some(previous) = self.last {
            self.walked_m += previous.distance_to(&position);
        }
        self.last = Some(position);

        let goal = f64::from(self.goal_m);
        if self.walked_m >= goal {
            Verdict::Done(ChallengeStatus::DistanceReached)
        } else {
            Verdict::Pending(ChallengeStatus::DistanceRemaining {
                walked: self.walked_m.floor() as u64,
                remaining: (goal - self.walked_m).ceil() as u64,
            })
        }
    }
}
