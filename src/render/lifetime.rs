use std::collections::BTreeMap;

use crate::{
    connection::entry::ConnectionEntry, foundation::core::TargetId, render::pool::PoolHandle,
};

/// Attach/detach work for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LifetimeChanges {
    /// Entries that became alive and need a connection.
    pub attach: Vec<TargetId>,
    /// Entries whose connection should be freed.
    pub detach: Vec<TargetId>,
}

impl LifetimeChanges {
    /// Whether nothing changes this tick.
    pub fn is_empty(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

/// Tracks which entries currently have a connection attached.
///
/// An entry is alive while `lifetime_start <= now < lifetime_end`; only alive entries hold
/// pooled resources.
#[derive(Debug, Default)]
pub struct LifetimeContainer {
    attached: BTreeMap<TargetId, PoolHandle>,
}

impl LifetimeContainer {
    /// Connection attached to the entry starting at `id`.
    pub fn attached(&self, id: TargetId) -> Option<PoolHandle> {
        self.attached.get(&id).copied()
    }

    /// Number of attached entries.
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Attached entries and their connections, by target id.
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, PoolHandle)> + '_ {
        self.attached.iter().map(|(id, h)| (*id, *h))
    }

    pub(crate) fn insert(&mut self, id: TargetId, connection: PoolHandle) {
        let prev = self.attached.insert(id, connection);
        assert!(prev.is_none(), "entry {id} already has a connection");
    }

    pub(crate) fn remove(&mut self, id: TargetId) -> Option<PoolHandle> {
        self.attached.remove(&id)
    }

    /// Work needed to match the attached set to the entries alive at `time`.
    pub fn changes(&self, entries: &[ConnectionEntry], time: f64) -> LifetimeChanges {
        let mut out = LifetimeChanges::default();
        for entry in entries {
            let alive = entry.is_alive_at(time);
            let attached = self.attached.contains_key(&entry.start());
            match (alive, attached) {
                (true, false) => out.attach.push(entry.start()),
                (false, true) => out.detach.push(entry.start()),
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/lifetime.rs"]
mod tests;
