use crate::animation::sequence::{Pose, Transforms};

/// Where a follow point is in its animation at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PointPhase {
    /// Acquired and positioned but not yet fading in.
    Acquired,
    /// Fading in while moving and shrinking into place.
    FadingIn,
    /// Fully shown.
    Visible,
    /// Fading out.
    FadingOut,
    /// Fade-out finished; due to go back to the pool.
    Expired,
}

/// A single pooled follow point.
///
/// Instances are recycled, so every field is overwritten by [`FollowPoint::reset`] when the
/// point is handed to a connection.
#[derive(Clone, Debug, Default)]
pub struct FollowPoint {
    transforms: Transforms,
    animation_start_time: f64,
}

impl FollowPoint {
    /// Drop all state inherited from earlier use and start over from `base`.
    pub fn reset(&mut self, base: Pose) {
        self.transforms.clear();
        self.transforms.set_base(base);
        self.animation_start_time = 0.0;
    }

    /// Time the point's own animation is anchored at (its fade-in start).
    pub fn animation_start_time(&self) -> f64 {
        self.animation_start_time
    }

    pub(crate) fn set_animation_start_time(&mut self, time: f64) {
        self.animation_start_time = time;
    }

    pub(crate) fn transforms_mut(&mut self) -> &mut Transforms {
        &mut self.transforms
    }

    /// Queued transforms.
    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Sampled pose at `time`.
    pub fn pose_at(&self, time: f64) -> Pose {
        self.transforms.pose_at(time)
    }

    /// Time the fade-out completes.
    pub fn lifetime_end(&self) -> f64 {
        self.transforms.lifetime_end()
    }

    /// Animation phase at `time`.
    pub fn phase_at(&self, time: f64) -> PointPhase {
        let fades = self.transforms.alpha_tweens();
        if time >= self.lifetime_end() {
            return PointPhase::Expired;
        }
        let Some(fade_in) = fades.first() else {
            return PointPhase::Acquired;
        };
        if time < fade_in.start {
            return PointPhase::Acquired;
        }
        if time < fade_in.end {
            return PointPhase::FadingIn;
        }
        match fades.get(1) {
            Some(fade_out) if time >= fade_out.start => PointPhase::FadingOut,
            _ => PointPhase::Visible,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connection/point.rs"]
mod tests;
