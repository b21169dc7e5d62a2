/// Pool sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolOpts {
    /// Slots allocated up front.
    pub prewarm: usize,
    /// Live count above which growth is logged. Acquisition never fails.
    pub soft_max: usize,
}

impl PoolOpts {
    /// Sizing for connection objects.
    pub const CONNECTIONS: Self = Self {
        prewarm: 1,
        soft_max: 200,
    };

    /// Sizing for follow point objects.
    pub const POINTS: Self = Self {
        prewarm: 50,
        soft_max: 1000,
    };
}

/// Generation-checked reference to a pool slot.
///
/// A handle goes stale as soon as its slot is released; stale handles resolve to `None`, which
/// is what keeps deferred work from reaching a recycled object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

/// Counters describing pool usage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    /// Currently acquired objects.
    pub live: usize,
    /// Objects waiting on the free list.
    pub free: usize,
    /// Highest `live` seen.
    pub peak_live: usize,
    /// Slots created after prewarming.
    pub grown: u64,
    /// Total successful acquisitions.
    pub acquired: u64,
    /// Total releases.
    pub released: u64,
}

struct Slot<T> {
    value: T,
    generation: u32,
    live: bool,
}

/// Arena of reusable objects.
///
/// Neither `acquire` nor `release` touches the object's state: whoever acquires is responsible
/// for resetting it.
pub struct Pool<T> {
    opts: PoolOpts,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    stats: PoolStats,
    warned_soft_max: bool,
}

impl<T: Default> Pool<T> {
    /// Create a pool with `opts.prewarm` free slots.
    pub fn new(opts: PoolOpts) -> Self {
        let mut slots = Vec::with_capacity(opts.prewarm);
        slots.resize_with(opts.prewarm, || Slot {
            value: T::default(),
            generation: 0,
            live: false,
        });
        // Reverse so the lowest index is handed out first.
        let free = (0..opts.prewarm as u32).rev().collect();
        Self {
            opts,
            slots,
            free,
            stats: PoolStats {
                free: opts.prewarm,
                ..PoolStats::default()
            },
            warned_soft_max: false,
        }
    }

    /// Take an object out of the pool, growing it if the free list is empty.
    pub fn acquire(&mut self) -> PoolHandle {
        let index = match self.free.pop() {
            Some(i) => {
                self.stats.free = self.stats.free.saturating_sub(1);
                i
            }
            None => {
                let i = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("pool exceeded u32 slots"));
                self.slots.push(Slot {
                    value: T::default(),
                    generation: 0,
                    live: false,
                });
                self.stats.grown = self.stats.grown.saturating_add(1);
                i
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.live = true;

        self.stats.live += 1;
        self.stats.peak_live = self.stats.peak_live.max(self.stats.live);
        self.stats.acquired = self.stats.acquired.saturating_add(1);

        if self.stats.live > self.opts.soft_max && !self.warned_soft_max {
            self.warned_soft_max = true;
            tracing::warn!(
                live = self.stats.live,
                soft_max = self.opts.soft_max,
                "pool grew past its soft maximum"
            );
        }

        PoolHandle {
            index,
            generation: slot.generation,
        }
    }

    /// [`Pool::acquire`], also borrowing the acquired object.
    pub fn acquire_mut(&mut self) -> (PoolHandle, &mut T) {
        let handle = self.acquire();
        (handle, &mut self.slots[handle.index as usize].value)
    }
}

impl<T> Pool<T> {
    /// Return an object to the free list. Releasing a stale handle is a broken contract.
    pub fn release(&mut self, handle: PoolHandle) {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.live && s.generation == handle.generation)
            .unwrap_or_else(|| panic!("release of stale pool handle {handle:?}"));

        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);

        self.stats.live = self.stats.live.saturating_sub(1);
        self.stats.free += 1;
        self.stats.released = self.stats.released.saturating_add(1);
    }

    /// Whether `handle` still refers to an acquired object.
    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Borrow the object behind a live handle.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.live && s.generation == handle.generation)
            .map(|s| &s.value)
    }

    /// Mutably borrow the object behind a live handle.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.live && s.generation == handle.generation)
            .map(|s| &mut s.value)
    }

    /// Snapshot of usage counters.
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pool.rs"]
mod tests;
