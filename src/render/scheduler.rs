use std::collections::HashSet;

use crate::render::pool::PoolHandle;

/// Deferred, coalescing refresh queue.
///
/// Requests made between two drains collapse into one per handle, in first-request order.
/// Handles are generation-checked by the caller when the queue is drained, so a request for a
/// connection that has since been released does nothing.
#[derive(Debug, Default)]
pub struct RefreshScheduler {
    queued: Vec<PoolHandle>,
    pending: HashSet<PoolHandle>,
}

impl RefreshScheduler {
    /// Queue a refresh for `handle` unless one is already pending.
    pub fn schedule_once(&mut self, handle: PoolHandle) -> bool {
        if !self.pending.insert(handle) {
            return false;
        }
        self.queued.push(handle);
        true
    }

    /// Number of pending refreshes.
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Take every pending request, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PoolHandle> {
        self.pending.clear();
        std::mem::take(&mut self.queued)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheduler.rs"]
mod tests;
