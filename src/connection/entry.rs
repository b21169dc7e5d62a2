use crate::{foundation::core::TargetId, render::pool::PoolHandle};

/// Fan-out invalidation signal with a one-shot pending flag.
///
/// Firing marks the signal pending; the owner of the index drains pending signals once per
/// mutation batch and forwards them to every subscriber.
#[derive(Clone, Debug, Default)]
pub struct Invalidation {
    subscribers: Vec<PoolHandle>,
    pending: bool,
}

impl Invalidation {
    /// Register a subscriber. Subscribing twice is a broken contract.
    pub fn subscribe(&mut self, subscriber: PoolHandle) {
        assert!(
            !self.subscribers.contains(&subscriber),
            "subscriber {subscriber:?} is already bound"
        );
        self.subscribers.push(subscriber);
    }

    /// Remove a subscriber. Returns whether it was bound.
    pub fn unsubscribe(&mut self, subscriber: PoolHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| *s != subscriber);
        self.subscribers.len() != before
    }

    /// Drop every subscriber.
    pub fn unbind_all(&mut self) {
        self.subscribers.clear();
    }

    /// Currently bound subscribers.
    pub fn subscribers(&self) -> &[PoolHandle] {
        &self.subscribers
    }

    /// Mark pending. Returns `true` only for the first firing since the last [`Self::take`].
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Consume the pending flag.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// The link from one target to the next one in time.
#[derive(Clone, Debug)]
pub struct ConnectionEntry {
    start: TargetId,
    start_key: f64,
    end: Option<TargetId>,
    invalidation: Invalidation,
    lifetime_start: f64,
    lifetime_end: f64,
}

impl ConnectionEntry {
    pub(crate) fn new(start: TargetId, start_time: f64) -> Self {
        Self {
            start,
            start_key: start_time,
            end: None,
            invalidation: Invalidation::default(),
            lifetime_start: start_time,
            lifetime_end: start_time,
        }
    }

    /// Target the connection leaves from.
    pub fn start(&self) -> TargetId {
        self.start
    }

    /// Start time captured when the entry was ordered.
    pub fn start_key(&self) -> f64 {
        self.start_key
    }

    /// Next target in time, if any.
    pub fn end(&self) -> Option<TargetId> {
        self.end
    }

    /// Relink the connection. Fires the invalidation signal when the end actually changes.
    ///
    /// Returns `true` when this is the first firing since the signal was last taken.
    pub(crate) fn set_end(&mut self, end: Option<TargetId>) -> bool {
        if self.end == end {
            return false;
        }
        self.end = end;
        self.invalidation.fire()
    }

    /// Invalidation signal for this entry.
    pub fn invalidation(&self) -> &Invalidation {
        &self.invalidation
    }

    pub(crate) fn invalidation_mut(&mut self) -> &mut Invalidation {
        &mut self.invalidation
    }

    /// Earliest time a point of this connection is visible.
    pub fn lifetime_start(&self) -> f64 {
        self.lifetime_start
    }

    /// Time the last point of this connection has finished fading out.
    pub fn lifetime_end(&self) -> f64 {
        self.lifetime_end
    }

    /// Whether the connection should be rendered at `time`.
    pub fn is_alive_at(&self, time: f64) -> bool {
        self.lifetime_start <= time && time < self.lifetime_end
    }

    pub(crate) fn set_lifetime(&mut self, start: f64, end: f64) {
        self.lifetime_start = start;
        self.lifetime_end = end;
    }

    pub(crate) fn set_lifetime_end(&mut self, end: f64) {
        self.lifetime_end = end;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connection/entry.rs"]
mod tests;
