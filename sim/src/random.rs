//! Random number sources threaded through every agent decision.
//!
//! Nothing in the simulation touches a global generator: the simulator owns a
//! [`RandomSource`] and lends it to each agent for the duration of its turn, so
//! a run is reproducible from its seed and tests can force particular draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform draws used by the simulation.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`. A zero bound is treated as one.
    fn next_below(&mut self, bound: u32) -> u32;

    /// In-place Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_below(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Index of a uniformly chosen element of a collection of `len` items.
    fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.next_below(len as u32) as usize)
        }
    }
}

/// The production source: a seedable `StdRng`.
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        self.0.gen_range(0..bound.max(1))
    }
}

/// A source that always returns the same draws.
///
/// `next_f64` yields `unit`; `next_below(bound)` yields `index` clamped into
/// range. With `unit = 0.0` every probability check succeeds, and `index`
/// picks litter sizes and the infection sentinel.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub unit: f64,
    pub index: u32,
}

impl FixedRandom {
    pub fn new(unit: f64, index: u32) -> Self {
        Self { unit, index }
    }
}

impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        self.unit
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        self.index.min(bound.max(1) - 1)
    }
}
