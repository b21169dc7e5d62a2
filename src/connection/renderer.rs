use crate::{
    animation::{ease::Ease, sequence::Pose},
    connection::{
        entry::ConnectionEntry,
        point::FollowPoint,
        timing::{FadeTimes, TimingModel},
    },
    foundation::core::{Point, Target, TargetId, TargetSource, Vec2, registered},
    render::pool::{Pool, PoolHandle},
};

/// Geometry and timing of one follow point before it is bound to a pooled object.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PointPlan {
    /// Position along the connection in `(0, 1)`.
    pub fraction: f64,
    /// Where the point appears.
    pub from: Point,
    /// Where the point settles.
    pub to: Point,
    /// Direction of the connection in degrees.
    pub rotation: f64,
    /// Scale while appearing.
    pub initial_scale: f64,
    /// Scale once settled.
    pub scale: f64,
    /// Fade window.
    pub fade: FadeTimes,
    /// Duration of both the fade-in and the fade-out.
    pub fade_duration: f64,
}

/// Longest connection that gets follow points, in pixels. Longer ones are treated as degenerate.
pub const MAX_SEGMENT_LENGTH: u32 = 1 << 16;

/// First point offset along a connection, in pixels.
fn first_offset(spacing: u32) -> u64 {
    u64::from(spacing) * 3 / 2
}

/// Euclidean length of `v`, or `None` past [`MAX_SEGMENT_LENGTH`] (or non-finite).
fn segment_length(v: Vec2) -> Option<f64> {
    let length = v.hypot();
    (length <= f64::from(MAX_SEGMENT_LENGTH)).then_some(length)
}

/// Lay out the follow points between `start` and `end`.
///
/// Points sit every `spacing` pixels starting at `1.5 * spacing` and stop one `spacing` short of
/// the end, so connections shorter than `2.5 * spacing` get no points at all. Neither do
/// connections longer than [`MAX_SEGMENT_LENGTH`].
pub fn plan_points(
    start: &Target,
    end: &Target,
    spacing: u32,
    timing: &TimingModel,
) -> Vec<PointPlan> {
    if spacing == 0 {
        return Vec::new();
    }

    let distance_vector = end.position - start.position;
    let Some(length) = segment_length(distance_vector) else {
        tracing::warn!(
            start = %start.id,
            end = %end.id,
            length = distance_vector.hypot(),
            "connection too long for follow points"
        );
        return Vec::new();
    };
    let distance = length as u64;
    let rotation = distance_vector.y.atan2(distance_vector.x).to_degrees();

    let step = u64::from(spacing);
    let mut out = Vec::new();
    let mut d = first_offset(spacing);
    while d + step < distance {
        let fraction = d as f64 / distance as f64;
        out.push(PointPlan {
            fraction,
            from: start.position + distance_vector * (fraction - 0.1),
            to: start.position + distance_vector * fraction,
            rotation,
            initial_scale: 1.5 * end.scale,
            scale: end.scale,
            fade: timing.fade_times(start, end, fraction),
            fade_duration: end.fade_in,
        });
        d += step;
    }
    out
}

/// Visible window of a connection before its points exist.
///
/// Starts at the fade-in of the first point. The end stays open until a refresh pins it to the
/// last point's expiry. Connections without points get an empty window.
pub(crate) fn entry_lifetime(
    start: &Target,
    end: Option<&Target>,
    spacing: u32,
    timing: &TimingModel,
) -> (f64, f64) {
    let collapsed = (start.start_time, start.start_time);
    let Some(end) = end else {
        return collapsed;
    };

    let Some(length) = segment_length(end.position - start.position) else {
        return collapsed;
    };
    let offset = first_offset(spacing);
    if spacing == 0 || offset + u64::from(spacing) >= length as u64 {
        return collapsed;
    }

    let fraction = offset as f64 / length;
    (timing.fade_times(start, end, fraction).fade_in, f64::INFINITY)
}

/// Renders the follow points of one connection entry.
///
/// A connection is pooled. It is bound to an entry with [`FollowPointConnection::apply`], which
/// subscribes it to the entry's invalidation signal, and unbound with
/// [`FollowPointConnection::free`].
#[derive(Debug, Default)]
pub struct FollowPointConnection {
    entry: Option<TargetId>,
    points: Vec<PoolHandle>,
}

impl FollowPointConnection {
    /// Start target of the bound entry.
    pub fn entry(&self) -> Option<TargetId> {
        self.entry
    }

    /// Handles of the points currently held.
    pub fn points(&self) -> &[PoolHandle] {
        &self.points
    }

    pub(crate) fn apply<S: TargetSource + ?Sized>(
        &mut self,
        this: PoolHandle,
        entry: &mut ConnectionEntry,
        targets: &S,
        pool: &mut Pool<FollowPoint>,
        spacing: u32,
        timing: &TimingModel,
    ) {
        assert!(
            self.entry.is_none(),
            "connection is already bound to {:?}",
            self.entry
        );
        self.entry = Some(entry.start());
        entry.invalidation_mut().subscribe(this);
        self.refresh(entry, targets, pool, spacing, timing);
    }

    pub(crate) fn free(
        &mut self,
        this: PoolHandle,
        entry: Option<&mut ConnectionEntry>,
        pool: &mut Pool<FollowPoint>,
    ) {
        if let Some(entry) = entry {
            entry.invalidation_mut().unsubscribe(this);
        }
        self.release_points(pool);
        self.entry = None;
    }

    /// Regenerate every point from the entry's current start and end.
    ///
    /// Returns the number of points produced.
    pub(crate) fn refresh<S: TargetSource + ?Sized>(
        &mut self,
        entry: &mut ConnectionEntry,
        targets: &S,
        pool: &mut Pool<FollowPoint>,
        spacing: u32,
        timing: &TimingModel,
    ) -> usize {
        assert_eq!(
            self.entry,
            Some(entry.start()),
            "refresh of a connection not bound to this entry"
        );

        self.release_points(pool);

        let Some(end_id) = entry.end() else {
            return 0;
        };
        let start = registered(targets, entry.start());
        let end = registered(targets, end_id);

        let mut final_end = start.start_time;
        for plan in plan_points(start, end, spacing, timing) {
            let (handle, point) = pool.acquire_mut();
            point.reset(Pose {
                position: plan.from,
                rotation: plan.rotation,
                scale: plan.initial_scale,
                alpha: 0.0,
            });
            point.set_animation_start_time(plan.fade.fade_in);

            let expires = point
                .transforms_mut()
                .begin_at(plan.fade.fade_in)
                .fade_in(plan.fade_duration)
                .scale_to(plan.scale, plan.fade_duration, Ease::Out)
                .move_to(plan.to, plan.fade_duration, Ease::Out)
                .delay(plan.fade.fade_out - plan.fade.fade_in)
                .fade_out(plan.fade_duration)
                .expire();

            final_end = final_end.max(expires);
            self.points.push(handle);
        }

        entry.set_lifetime_end(final_end);
        tracing::trace!(
            start = %entry.start(),
            end = %end_id,
            points = self.points.len(),
            lifetime_end = final_end,
            "connection refreshed"
        );
        self.points.len()
    }

    /// Release points whose fade-out has finished by `time`. Returns how many were released.
    pub(crate) fn expire_points(&mut self, time: f64, pool: &mut Pool<FollowPoint>) -> usize {
        let before = self.points.len();
        self.points.retain(|&h| {
            let alive = pool.get(h).is_some_and(|p| time < p.lifetime_end());
            if !alive && pool.is_live(h) {
                pool.release(h);
            }
            alive
        });
        before - self.points.len()
    }

    fn release_points(&mut self, pool: &mut Pool<FollowPoint>) {
        for h in self.points.drain(..) {
            pool.release(h);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connection/renderer.rs"]
mod tests;
