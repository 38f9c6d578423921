//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter where one tick is one
//! simulated second.  Runs are hard-capped at 1200 ticks, so `u32` leaves
//! enormous headroom while keeping per-vehicle state compact.  Using an
//! integer tick as the canonical time unit means all schedule arithmetic is
//! exact (no floating-point drift) and comparisons are O(1).

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter (1 tick = 1 simulated second).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u32);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u32) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u32 {
        self.0 - earlier.0
    }

    /// Position of this tick within a signal cycle of length `cycle`,
    /// shifted by `offset` seconds.
    #[inline]
    pub fn cycle_pos(self, offset: u32, cycle: u32) -> u32 {
        (self.0 + offset) % cycle
    }

    /// Index of the signal cycle this tick falls in (same shift as
    /// [`cycle_pos`][Tick::cycle_pos]).
    #[inline]
    pub fn cycle_index(self, offset: u32, cycle: u32) -> u32 {
        (self.0 + offset) / cycle
    }
}

impl std::ops::Add<u32> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u32) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u32;
    #[inline]
    fn sub(self, rhs: Tick) -> u32 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
