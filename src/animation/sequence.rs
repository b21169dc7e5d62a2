use crate::{animation::ease::Ease, foundation::core::Point};

/// Linear interpolation between two values of the same kind.
pub trait Lerp: Sized {
    /// Interpolate from `a` (t = 0) to `b` (t = 1).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

/// One timed interpolation of a single property, in absolute time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tween<T> {
    /// Absolute start time.
    pub start: f64,
    /// Absolute end time (`>= start`).
    pub end: f64,
    /// Value at `start`.
    pub from: T,
    /// Value at `end` and afterwards.
    pub to: T,
    /// Curve applied to progress.
    pub ease: Ease,
}

impl<T: Lerp + Copy> Tween<T> {
    fn value_at(&self, time: f64) -> T {
        if time >= self.end {
            return self.to;
        }
        let span = self.end - self.start;
        if span <= 0.0 {
            return self.to;
        }
        let t = (time - self.start) / span;
        T::lerp(&self.from, &self.to, self.ease.apply(t))
    }
}

#[derive(Clone, Debug)]
struct Track<T> {
    tweens: Vec<Tween<T>>, // sorted by start
}

impl<T> Default for Track<T> {
    fn default() -> Self {
        Self { tweens: Vec::new() }
    }
}

impl<T: Lerp + Copy> Track<T> {
    fn value_at(&self, base: T, time: f64) -> T {
        let idx = self.tweens.partition_point(|tw| tw.start <= time);
        if idx == 0 {
            return base;
        }
        self.tweens[idx - 1].value_at(time)
    }

    fn push(&mut self, base: T, start: f64, duration: f64, to: T, ease: Ease) {
        let from = self.value_at(base, start);
        let idx = self.tweens.partition_point(|tw| tw.start <= start);
        self.tweens.insert(
            idx,
            Tween {
                start,
                end: start + duration.max(0.0),
                from,
                to,
                ease,
            },
        );
    }

    fn end_time(&self) -> Option<f64> {
        self.tweens.iter().map(|tw| tw.end).reduce(f64::max)
    }
}

/// Sampled visual state of an animated object.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Pose {
    /// Playfield position.
    pub position: Point,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            rotation: 0.0,
            scale: 1.0,
            alpha: 1.0,
        }
    }
}

/// Absolute-time transform queue for one object.
///
/// Values set directly form the base pose; tweens queued through [`Transforms::begin_at`] take
/// over from their start time onwards.
#[derive(Clone, Debug)]
pub struct Transforms {
    base: Pose,
    alpha: Track<f64>,
    scale: Track<f64>,
    position: Track<Point>,
    lifetime_end: f64,
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new(Pose::default())
    }
}

impl Transforms {
    /// Empty transform queue over `base`.
    pub fn new(base: Pose) -> Self {
        Self {
            base,
            alpha: Track::default(),
            scale: Track::default(),
            position: Track::default(),
            lifetime_end: f64::INFINITY,
        }
    }

    /// Drop every queued tween and clear the expiry.
    pub fn clear(&mut self) {
        self.alpha.tweens.clear();
        self.scale.tweens.clear();
        self.position.tweens.clear();
        self.lifetime_end = f64::INFINITY;
    }

    /// Pose before any tween applies.
    pub fn base(&self) -> Pose {
        self.base
    }

    /// Replace the base pose.
    pub fn set_base(&mut self, base: Pose) {
        self.base = base;
    }

    /// Open a sequence whose operations start at `time` instead of "now".
    pub fn begin_at(&mut self, time: f64) -> Sequence<'_> {
        Sequence {
            transforms: self,
            cursor: time,
        }
    }

    /// Sample the pose at an absolute time.
    pub fn pose_at(&self, time: f64) -> Pose {
        Pose {
            position: self.position.value_at(self.base.position, time),
            rotation: self.base.rotation,
            scale: self.scale.value_at(self.base.scale, time),
            alpha: self.alpha.value_at(self.base.alpha, time),
        }
    }

    /// Latest end time over all queued tweens.
    pub fn latest_end_time(&self) -> Option<f64> {
        [
            self.alpha.end_time(),
            self.scale.end_time(),
            self.position.end_time(),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::max)
    }

    /// Alpha tweens in start order.
    pub fn alpha_tweens(&self) -> &[Tween<f64>] {
        &self.alpha.tweens
    }

    /// Time after which the object is no longer needed. Infinite until expired.
    pub fn lifetime_end(&self) -> f64 {
        self.lifetime_end
    }
}

/// Builder for tweens anchored at an absolute time.
pub struct Sequence<'a> {
    transforms: &'a mut Transforms,
    cursor: f64,
}

impl Sequence<'_> {
    /// Shift subsequent operations by `duration`.
    pub fn delay(&mut self, duration: f64) -> &mut Self {
        self.cursor += duration;
        self
    }

    /// Tween alpha to `alpha`.
    pub fn fade_to(&mut self, alpha: f64, duration: f64, ease: Ease) -> &mut Self {
        let base = self.transforms.base.alpha;
        self.transforms
            .alpha
            .push(base, self.cursor, duration, alpha, ease);
        self
    }

    /// Tween alpha to fully opaque.
    pub fn fade_in(&mut self, duration: f64) -> &mut Self {
        self.fade_to(1.0, duration, Ease::Linear)
    }

    /// Tween alpha to fully transparent.
    pub fn fade_out(&mut self, duration: f64) -> &mut Self {
        self.fade_to(0.0, duration, Ease::Linear)
    }

    /// Tween the uniform scale.
    pub fn scale_to(&mut self, scale: f64, duration: f64, ease: Ease) -> &mut Self {
        let base = self.transforms.base.scale;
        self.transforms
            .scale
            .push(base, self.cursor, duration, scale, ease);
        self
    }

    /// Tween the position.
    pub fn move_to(&mut self, position: Point, duration: f64, ease: Ease) -> &mut Self {
        let base = self.transforms.base.position;
        self.transforms
            .position
            .push(base, self.cursor, duration, position, ease);
        self
    }

    /// End the object's lifetime once every queued tween has finished. Returns that time.
    pub fn expire(&mut self) -> f64 {
        let end = self
            .transforms
            .latest_end_time()
            .unwrap_or(self.cursor)
            .max(self.cursor);
        self.transforms.lifetime_end = end;
        end
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sequence.rs"]
mod tests;
