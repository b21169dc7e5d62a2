use crate::{
    connection::entry::ConnectionEntry,
    foundation::core::{Target, TargetId},
};

/// Connections ordered by start time, each linked to its successor's start target.
///
/// Chain invariant: `entries[i].end() == Some(entries[i + 1].start())` for every entry but the
/// last, whose end is `None`. Entries with equal start times keep their insertion order.
#[derive(Debug, Default)]
pub struct OrderedConnectionIndex {
    entries: Vec<ConnectionEntry>,
    invalidated: Vec<TargetId>,
}

impl OrderedConnectionIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` and return the position of its entry.
    ///
    /// A new entry lands after every existing entry with the same start time, so simultaneous
    /// targets never steal the end of a connection that is already rendered.
    pub fn insert(&mut self, target: &Target) -> usize {
        assert!(
            self.position(target.id).is_none(),
            "target {} is already registered",
            target.id
        );

        let index = self
            .entries
            .partition_point(|e| e.start_key() <= target.start_time);

        // h1 -> -> -> h2
        //  new entry    next entry
        let mut entry = ConnectionEntry::new(target.id, target.start_time);
        entry.set_end(self.entries.get(index).map(ConnectionEntry::start));
        entry.invalidation_mut().fire();
        self.entries.insert(index, entry);
        self.invalidated.push(target.id);

        // h1 -> -> -> h2
        //  prev entry   new entry
        if index > 0 {
            self.relink(index - 1, Some(target.id));
        }

        tracing::debug!(id = %target.id, index, len = self.entries.len(), "connection inserted");
        index
    }

    /// Unregister `id`, bridging its predecessor over the gap. Returns the removed entry with its
    /// subscribers unbound.
    ///
    /// Panics if `id` is not registered.
    pub fn remove(&mut self, id: TargetId) -> ConnectionEntry {
        let index = self
            .position(id)
            .unwrap_or_else(|| panic!("target {id} is not registered"));

        let mut entry = self.entries.remove(index);
        entry.invalidation_mut().unbind_all();
        self.invalidated.retain(|t| *t != id);

        // h1 -> -> -> h2 -> -> -> h3
        //  prev entry   removed      next entry
        // The removed entry's end is used since there may be no next entry.
        if index > 0 {
            self.relink(index - 1, entry.end());
        }

        tracing::debug!(id = %id, index, len = self.entries.len(), "connection removed");
        entry
    }

    /// Re-order `target` after its start time changed.
    pub fn update_key(&mut self, target: &Target) -> usize {
        self.remove(target.id);
        self.insert(target)
    }

    /// Mark the entry leaving `id` and the entry arriving at `id` as invalidated.
    pub fn invalidate_target(&mut self, id: TargetId) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.invalidate_at(index);
        if index > 0 {
            self.invalidate_at(index - 1);
        }
    }

    /// Take the ids of every entry invalidated since the last call, consuming their pending flags.
    pub fn take_invalidated(&mut self) -> Vec<TargetId> {
        let ids = std::mem::take(&mut self.invalidated);
        ids.into_iter()
            .filter(|id| {
                self.get_mut(*id)
                    .is_some_and(|e| e.invalidation_mut().take())
            })
            .collect()
    }

    /// Drop every entry, unbinding their subscribers.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.invalidation_mut().unbind_all();
        }
        self.entries.clear();
        self.invalidated.clear();
    }

    /// Entries in time order.
    pub fn entries(&self) -> &[ConnectionEntry] {
        &self.entries
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no target is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the entry starting at `id`.
    pub fn position(&self, id: TargetId) -> Option<usize> {
        self.entries.iter().position(|e| e.start() == id)
    }

    /// Entry starting at `id`.
    pub fn get(&self, id: TargetId) -> Option<&ConnectionEntry> {
        self.entries.iter().find(|e| e.start() == id)
    }

    pub(crate) fn get_mut(&mut self, id: TargetId) -> Option<&mut ConnectionEntry> {
        self.entries.iter_mut().find(|e| e.start() == id)
    }

    /// Whether every entry's end is its successor's start and the last end is `None`.
    pub fn is_chain_consistent(&self) -> bool {
        let linked = self
            .entries
            .windows(2)
            .all(|w| w[0].end() == Some(w[1].start()));
        let ordered = self
            .entries
            .windows(2)
            .all(|w| w[0].start_key() <= w[1].start_key());
        linked && ordered && self.entries.last().is_none_or(|e| e.end().is_none())
    }

    fn relink(&mut self, index: usize, end: Option<TargetId>) {
        let entry = &mut self.entries[index];
        if entry.set_end(end) {
            self.invalidated.push(entry.start());
        }
    }

    fn invalidate_at(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        if entry.invalidation_mut().fire() {
            self.invalidated.push(entry.start());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connection/index.rs"]
mod tests;
