//! The seeded random source for a run.
//!
//! Every stochastic choice in the model (intervention assignment, placement and infection
//! trials) draws from a single [`SimRng`]. Two runs that start from the same seed string and
//! configuration consume the generator in the same order and therefore produce identical
//! histories.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::hashing::hash_str;
use crate::log::trace;

/// Rejection-sampling loops give up after this many draws per slot in the pool they sample
/// from.
pub(crate) const MAX_DRAWS_PER_SLOT: usize = 10_000;

// `StdRng` rather than `SmallRng`: the latter's algorithm differs between 32 and 64 bit
// targets, which would break reproducibility across machines.
pub struct SimRng {
    seed: String,
    rng: StdRng,
}

impl SimRng {
    /// Creates a generator whose sequence is fully determined by `seed`.
    pub fn from_seed_str(seed: &str) -> Self {
        trace!("seeding rng from {seed:?}");
        SimRng {
            seed: seed.to_string(),
            rng: StdRng::seed_from_u64(hash_str(seed)),
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Returns an integer uniformly in `[0, n)`. Callers must pass `n > 0`; `0` yields `0`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn draw_int(&mut self, n: usize) -> usize {
        let value = (self.next_f64() * n as f64).floor() as usize;
        value.min(n.saturating_sub(1))
    }
}
