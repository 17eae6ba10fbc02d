//! Deterministic per-component RNG.
//!
//! Each component that needs randomness gets its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (component_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids across the seed space.  Components never
//! share RNG state, so the order in which they execute within a phase has
//! no influence on what they draw.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ComponentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-component deterministic RNG.
pub struct ComponentRng(SmallRng);

impl ComponentRng {
    /// Seed deterministically from the run's global seed and a component id.
    pub fn new(global_seed: u64, component: ComponentId) -> Self {
        let seed = global_seed ^ (component.0 as u64).wrapping_mul(MIXING_CONSTANT);
        ComponentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
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
