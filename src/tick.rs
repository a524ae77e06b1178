use std::sync::atomic::{AtomicU64, Ordering};

/// A generation number. Zero means "never issued".
pub type Tick = u64;

/// Issues strictly increasing ticks, starting from 1. Safe to share between threads.
#[derive(Debug, Default)]
pub struct TickCounter(AtomicU64);

impl TickCounter {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increments the counter and returns the new value.
    #[inline]
    pub fn next(&self) -> Tick {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns the most recently issued tick without incrementing, or 0 if none was issued.
    #[inline]
    pub fn current(&self) -> Tick {
        self.0.load(Ordering::Acquire)
    }
}

/// Process-wide; unlike the context registers, ticks are unique across threads.
static COUNTER: TickCounter = TickCounter::new();

/// Issues the next process-wide tick.
#[inline]
pub fn next_tick() -> Tick {
    COUNTER.next()
}

/// Returns the last process-wide tick issued, without issuing a new one.
#[inline]
pub fn current_tick() -> Tick {
    COUNTER.current()
}

/// Records when something was last modified, for cheap staleness checks by other holders.
///
/// ```
/// use tensor_common::Stamp;
///
/// let mut stamp = Stamp::new();
/// let seen = stamp.tick();
/// assert!(!stamp.is_newer_than(seen));
/// stamp.touch();
/// assert!(stamp.is_newer_than(seen));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(Tick);

impl Default for Stamp {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Stamp {
    /// Stamps with a fresh tick.
    #[inline]
    pub fn new() -> Self {
        Self(next_tick())
    }

    /// Re-stamps after a mutation.
    #[inline]
    pub fn touch(&mut self) {
        self.0 = next_tick();
    }

    #[inline]
    pub fn tick(self) -> Tick {
        self.0
    }

    /// Returns `true` if modified after `tick` was observed.
    #[inline]
    pub fn is_newer_than(self, tick: Tick) -> bool {
        self.0 > tick
    }
}
