use super::{ChallengeStatus, Verdict};
use crate::traits::{MotionSample, OrientationSample};

/// Allowed deviation from a 180° front/back tilt
pub const UPSIDE_DOWN_TOLERANCE_DEG: f64 = 25.0;

/// Acceleration magnitude that counts as a shake, m/s²
pub const SHAKE_THRESHOLD: f64 = 15.0;

pub const REQUIRED_SHAKES: u32 = 2;

pub fn is_upside_down(sample: &OrientationSample) -> bool {
    (sample.beta.abs() - 180.0).abs() <= UPSIDE_DOWN_TOLERANCE_DEG
}

/// Upside-down flag and shake count. Samples only count while a listening
/// window is open; progress carries over into the next window.
#[derive(Default)]
pub(crate) struct SensorCheck {
    window_open: bool,
    upside_down: bool,
    shakes: u32,
    // a shake is counted on the rising edge across the threshold
    above_threshold: bool,
}

impl SensorCheck {
    fn listening(&self) -> ChallengeStatus {
        ChallengeStatus::SensorListening {
            upside_down: self.upside_down,
            shakes: self.shakes,
        }
    }

    pub fn open_window(&mut self) -> Verdict {
        self.window_open = true;
        self.above_threshold = false;
        Verdict::Pending(self.listening())
    }

    pub fn close_window(&mut self) -> Verdict {
        self.window_open = false;
        Verdict::Pending(ChallengeStatus::SensorWindowExpired)
    }

    pub fn unavailable(&mut self) -> Verdict {
        self.window_open = false;
        Verdict::Pending(ChallengeStatus::SensorUnavailable)
    }

    pub fn on_orientation(&mut self, sample: &OrientationSample) -> Option<Verdict> {
        if !self.window_open {
            return None;
        }

        if is_upside_down(sample) {
            self.upside_down = true;
        }
        Some(Verdict::Pending(self.listening()))
    }

    pub fn on_motion(&mut self, sample: &MotionSample) -> Option<Verdict> {
        if !self.window_open {
            return None;
        }

        if sample.magnitude() >= SHAKE_THRESHOLD {
            if !self.above_threshold {
                self.shakes += 1;
                self.above_threshold = true;
            }
        } else {
            self.above_threshold = false;
        }

        if self.upside_down && self.shakes >= REQUIRED_SHAKES {
            Some(Verdict::Done(ChallengeStatus::SensorCompleted))
        } else {
            Some(Verdict::Pending(self.listening()))
        }
    }
}
