use crate::{
    animation::sequence::Pose,
    connection::{
        entry::ConnectionEntry,
        index::OrderedConnectionIndex,
        point::{FollowPoint, PointPhase},
        renderer::{FollowPointConnection, MAX_SEGMENT_LENGTH, entry_lifetime},
        timing::{SPACING, TimingModel},
    },
    foundation::{
        core::{Target, TargetId, TargetSource, registered},
        error::{FollowPointError, FollowPointResult},
    },
    render::{
        lifetime::LifetimeContainer,
        pool::{Pool, PoolOpts, PoolStats},
        scheduler::RefreshScheduler,
    },
};

/// Renderer configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererOpts {
    /// Distance between follow points, in pixels.
    pub spacing: u32,
    /// Fade timing.
    pub timing: TimingModel,
    /// Connection pool sizing.
    pub connection_pool: PoolOpts,
    /// Follow point pool sizing.
    pub point_pool: PoolOpts,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            spacing: SPACING,
            timing: TimingModel::default(),
            connection_pool: PoolOpts::CONNECTIONS,
            point_pool: PoolOpts::POINTS,
        }
    }
}

impl RendererOpts {
    /// Reject configurations the renderer cannot run with.
    pub fn validate(&self) -> FollowPointResult<()> {
        if self.spacing == 0 || self.spacing > MAX_SEGMENT_LENGTH {
            return Err(FollowPointError::config(format!(
                "spacing must be in 1..={MAX_SEGMENT_LENGTH}, got {}",
                self.spacing
            )));
        }
        self.timing.validate()?;
        for (name, pool) in [
            ("connection_pool", self.connection_pool),
            ("point_pool", self.point_pool),
        ] {
            if pool.prewarm > pool.soft_max {
                return Err(FollowPointError::config(format!(
                    "{name} prewarm ({}) exceeds soft_max ({})",
                    pool.prewarm, pool.soft_max
                )));
            }
        }
        Ok(())
    }
}

/// A live follow point sampled at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PointSnapshot {
    /// Start target of the connection the point belongs to.
    pub connection: TargetId,
    /// Animation phase.
    pub phase: PointPhase,
    /// Sampled pose.
    pub pose: Pose,
    /// Fade-in start of the point.
    pub animation_start_time: f64,
}

/// Resource usage of a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RendererStats {
    /// Registered targets.
    pub entries: usize,
    /// Entries with a connection attached.
    pub attached: usize,
    /// Refreshes waiting for the next tick.
    pub pending_refreshes: usize,
    /// Connection pool counters.
    pub connections: PoolStats,
    /// Follow point pool counters.
    pub points: PoolStats,
}

/// Maintains follow point connections for a changing set of targets.
///
/// Registration calls relink the chain immediately. Everything that depends on target data
/// (lifetimes, point generation, expiry) happens in [`FollowPointRenderer::update`], which is
/// meant to be called once per frame.
pub struct FollowPointRenderer {
    opts: RendererOpts,
    index: OrderedConnectionIndex,
    container: LifetimeContainer,
    connections: Pool<FollowPointConnection>,
    points: Pool<FollowPoint>,
    scheduler: RefreshScheduler,
}

impl FollowPointRenderer {
    /// Create a renderer with validated options.
    pub fn new(opts: RendererOpts) -> FollowPointResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            index: OrderedConnectionIndex::new(),
            container: LifetimeContainer::default(),
            connections: Pool::new(opts.connection_pool),
            points: Pool::new(opts.point_pool),
            scheduler: RefreshScheduler::default(),
        })
    }

    /// Options the renderer was built with.
    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// Register a target and link it into the chain.
    ///
    /// Panics if `id` is already registered.
    #[tracing::instrument(skip(self, targets))]
    pub fn add_target<S: TargetSource + ?Sized>(
        &mut self,
        targets: &S,
        id: TargetId,
    ) -> FollowPointResult<()> {
        let target = lookup(targets, id)?;
        self.index.insert(&target);
        Ok(())
    }

    /// Unregister a target, bridging its neighbours and freeing its connection.
    ///
    /// Panics if `id` is not registered.
    #[tracing::instrument(skip(self))]
    pub fn remove_target(&mut self, id: TargetId) {
        self.detach(id);
        self.index.remove(id);
    }

    /// Re-order a target whose start time changed.
    #[tracing::instrument(skip(self, targets))]
    pub fn start_time_changed<S: TargetSource + ?Sized>(
        &mut self,
        targets: &S,
        id: TargetId,
    ) -> FollowPointResult<()> {
        let target = lookup(targets, id)?;
        self.detach(id);
        self.index.update_key(&target);
        Ok(())
    }

    /// Recompute the connections leaving and entering a target that moved.
    #[tracing::instrument(skip(self, targets))]
    pub fn position_changed<S: TargetSource + ?Sized>(
        &mut self,
        targets: &S,
        id: TargetId,
    ) -> FollowPointResult<()> {
        lookup(targets, id)?;
        self.index.invalidate_target(id);
        Ok(())
    }

    /// Advance to `time`: apply pending invalidations, attach and detach connections, run
    /// deferred refreshes, and return expired points to the pool.
    #[tracing::instrument(skip(self, targets))]
    pub fn update<S: TargetSource + ?Sized>(&mut self, targets: &S, time: f64) {
        self.process_invalidations(targets);

        let changes = self.container.changes(self.index.entries(), time);
        for id in changes.detach {
            self.detach(id);
        }
        for id in changes.attach {
            self.attach(targets, id);
        }

        self.flush_refreshes(targets);

        for (_, handle) in self.container.iter() {
            if let Some(connection) = self.connections.get_mut(handle) {
                connection.expire_points(time, &mut self.points);
            }
        }
    }

    /// Free every connection and drop every entry.
    pub fn clear(&mut self) {
        let attached: Vec<TargetId> = self.container.iter().map(|(id, _)| id).collect();
        for id in attached {
            self.detach(id);
        }
        self.index.clear();
        self.scheduler.drain();
    }

    /// Entries in time order.
    pub fn entries(&self) -> &[ConnectionEntry] {
        self.index.entries()
    }

    /// The ordered index.
    pub fn index(&self) -> &OrderedConnectionIndex {
        &self.index
    }

    /// Whether the entry starting at `id` currently has a connection.
    pub fn is_attached(&self, id: TargetId) -> bool {
        self.container.attached(id).is_some()
    }

    /// Points held by the connection leaving `id`, in generation order.
    pub fn connection_points(&self, id: TargetId) -> Vec<&FollowPoint> {
        self.container
            .attached(id)
            .and_then(|h| self.connections.get(h))
            .map(|c| {
                c.points()
                    .iter()
                    .filter_map(|h| self.points.get(*h))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every point that is fading or shown at `time`, in connection order.
    pub fn visible_points(&self, time: f64) -> Vec<PointSnapshot> {
        let mut out = Vec::new();
        for entry in self.index.entries() {
            for point in self.connection_points(entry.start()) {
                let phase = point.phase_at(time);
                if matches!(phase, PointPhase::Acquired | PointPhase::Expired) {
                    continue;
                }
                out.push(PointSnapshot {
                    connection: entry.start(),
                    phase,
                    pose: point.pose_at(time),
                    animation_start_time: point.animation_start_time(),
                });
            }
        }
        out
    }

    /// Resource usage.
    pub fn stats(&self) -> RendererStats {
        RendererStats {
            entries: self.index.len(),
            attached: self.container.len(),
            pending_refreshes: self.scheduler.len(),
            connections: self.connections.stats(),
            points: self.points.stats(),
        }
    }

    fn process_invalidations<S: TargetSource + ?Sized>(&mut self, targets: &S) {
        let spacing = self.opts.spacing;
        let timing = self.opts.timing;
        for id in self.index.take_invalidated() {
            let Some(entry) = self.index.get_mut(id) else {
                continue;
            };
            let start = registered(targets, id);
            let end = entry.end().map(|e| registered(targets, e));
            let (lifetime_start, lifetime_end) = entry_lifetime(start, end, spacing, &timing);
            entry.set_lifetime(lifetime_start, lifetime_end);

            for &subscriber in entry.invalidation().subscribers() {
                self.scheduler.schedule_once(subscriber);
            }
        }
    }

    fn flush_refreshes<S: TargetSource + ?Sized>(&mut self, targets: &S) {
        for handle in self.scheduler.drain() {
            let Some(connection) = self.connections.get_mut(handle) else {
                tracing::trace!(?handle, "skipping refresh of a released connection");
                continue;
            };
            let Some(entry) = connection.entry().and_then(|id| self.index.get_mut(id)) else {
                continue;
            };
            connection.refresh(
                entry,
                targets,
                &mut self.points,
                self.opts.spacing,
                &self.opts.timing,
            );
        }
    }

    fn attach<S: TargetSource + ?Sized>(&mut self, targets: &S, id: TargetId) {
        let Some(entry) = self.index.get_mut(id) else {
            return;
        };
        let (handle, connection) = self.connections.acquire_mut();
        *connection = FollowPointConnection::default();
        connection.apply(
            handle,
            entry,
            targets,
            &mut self.points,
            self.opts.spacing,
            &self.opts.timing,
        );
        self.container.insert(id, handle);
        tracing::debug!(id = %id, points = connection.points().len(), "connection attached");
    }

    fn detach(&mut self, id: TargetId) {
        let Some(handle) = self.container.remove(id) else {
            return;
        };
        if let Some(connection) = self.connections.get_mut(handle) {
            connection.free(handle, self.index.get_mut(id), &mut self.points);
        }
        self.connections.release(handle);
        tracing::debug!(id = %id, "connection detached");
    }
}

fn lookup<S: TargetSource + ?Sized>(targets: &S, id: TargetId) -> FollowPointResult<Target> {
    let target = targets
        .target(id)
        .copied()
        .ok_or_else(|| FollowPointError::validation(format!("target {id} not found")))?;
    target.validate()?;
    Ok(target)
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
