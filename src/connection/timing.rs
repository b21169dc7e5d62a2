use crate::foundation::{
    core::Target,
    error::{FollowPointError, FollowPointResult},
};

/// Distance between consecutive follow points, in playfield pixels.
pub const SPACING: u32 = 32;

/// Lead time of a follow point at baseline approach speed, in milliseconds.
pub const BASE_PREEMPT: f64 = 800.0;

/// Target preempt at which follow point lead time stops shrinking, in milliseconds.
pub const PREEMPT_MIN: f64 = 450.0;

/// Fade window of a single follow point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FadeTimes {
    /// When the point starts fading in.
    pub fade_in: f64,
    /// When the point starts fading out.
    pub fade_out: f64,
}

/// Maps a position along a connection to the point's fade times.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingModel {
    /// Follow point lead time for targets at or above `preempt_min`.
    pub base_preempt: f64,
    /// Target preempt that maps to the full `base_preempt`.
    pub preempt_min: f64,
}

impl Default for TimingModel {
    fn default() -> Self {
        Self {
            base_preempt: BASE_PREEMPT,
            preempt_min: PREEMPT_MIN,
        }
    }
}

impl TimingModel {
    /// Reject values that would make the preempt scale undefined or negative.
    pub fn validate(&self) -> FollowPointResult<()> {
        if !self.base_preempt.is_finite() || self.base_preempt < 0.0 {
            return Err(FollowPointError::config(
                "timing base_preempt must be finite and >= 0",
            ));
        }
        if !self.preempt_min.is_finite() || self.preempt_min <= 0.0 {
            return Err(FollowPointError::config(
                "timing preempt_min must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Follow point lead time for connections leaving `start`.
    ///
    /// Targets approaching faster than `preempt_min` shrink the lead time proportionally;
    /// slower targets never stretch it past `base_preempt`.
    pub fn preempt(&self, start: &Target) -> f64 {
        self.base_preempt * (start.preempt / self.preempt_min).min(1.0)
    }

    /// Fade times of a point located at `fraction` of the way from `start` to `end`.
    pub fn fade_times(&self, start: &Target, end: &Target, fraction: f64) -> FadeTimes {
        let duration = end.start_time - start.start_time;
        let fade_out = start.start_time + fraction * duration;
        FadeTimes {
            fade_in: fade_out - self.preempt(start),
            fade_out,
        }
    }
}

/// [`TimingModel::fade_times`] with the default constants.
pub fn fade_times(start: &Target, end: &Target, fraction: f64) -> FadeTimes {
    TimingModel::default().fade_times(start, end, fraction)
}

#[cfg(test)]
#[path = "../../tests/unit/connection/timing.rs"]
mod tests;
