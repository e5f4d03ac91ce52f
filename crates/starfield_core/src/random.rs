//! Random source helpers

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform sample from [low, high); degenerate ranges collapse to `low`
pub(crate) fn uniform<R: Rng>(rng: &mut R, low: f32, high: f32) -> f32 {
    if low < high {
        // Float rounding can land exactly on `high`
        let v = rng.random_range(low..high);
        if v < high { v } else { low }
    } else {
        low
    }
}

/// Seeded generator when a seed is given, OS-seeded otherwise
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
