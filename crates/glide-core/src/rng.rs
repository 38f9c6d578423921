//! Per-run deterministic RNG wrapper.
//!
//! # Determinism strategy
//!
//! Every simulation run owns exactly one `RunRng`, created from the run's
//! seed (or OS entropy when no seed is given).  Derived child streams —
//! one for car demand, one per bus timetable — are split off with
//! [`RunRng::child`] using a golden-ratio mixing constant so that changing
//! one stream's consumption pattern never perturbs the others.
//!
//! Because the RNG is owned by the run and never shared, concurrent runs
//! need no synchronisation: isolation is the whole concurrency discipline.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── RunRng ────────────────────────────────────────────────────────────────────

/// Per-run deterministic RNG.
///
/// The type is `!Sync` to prevent accidental sharing across threads — each
/// run must hold its own instance.
pub struct RunRng(SmallRng);

impl RunRng {
    /// Seed deterministically from a run seed.
    pub fn new(seed: u64) -> Self {
        RunRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from OS entropy (non-reproducible runs).
    pub fn from_entropy() -> Self {
        RunRng(SmallRng::from_entropy())
    }

    /// Derive a child `RunRng` with a different seed offset — useful for
    /// giving each generated schedule its own independent stream.
    pub fn child(&mut self, offset: u64) -> RunRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        RunRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types
    /// (`rng.inner().sample(...)` etc.)
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
