//! Random number generation helpers.
//!
//! Every stochastic step of both genetic algorithms draws from a single
//! [`StdRng`] threaded through the call chain, so a fixed seed reproduces
//! a run exactly.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a seeded RNG.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates an RNG from an optional seed, drawing a fresh one when `None`.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => create_rng(s),
        None => create_rng(rand::random()),
    }
}
