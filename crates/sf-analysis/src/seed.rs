//! Per-trial random streams.
//!
//! Every trial owns a `StdRng` seeded from the study's base seed and the trial
//! index, so results do not depend on how rayon schedules the work.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// SplitMix64 finaliser.
pub fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The configured seed, or one drawn from OS entropy.
pub fn base_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| StdRng::from_entropy().r#gen())
}

/// Rng for trial `index` of a study seeded with `base`.
pub fn trial_rng(base: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(base ^ splitmix64(index as u64))
}

/// Base seed of sub-study `stream` (one per Bernoulli level, sweep point, ...).
pub fn stream_seed(base: u64, stream: usize) -> u64 {
    splitmix64(base.wrapping_add((stream as u64).wrapping_mul(0xD1B5_4A32_D192_ED03)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_streams_are_reproducible() {
        let a: Vec<u32> = (0..4).map(|i| trial_rng(7, i).r#gen()).collect();
        let b: Vec<u32> = (0..4).map(|i| trial_rng(7, i).r#gen()).collect();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn streams_differ() {
        assert_ne!(stream_seed(1, 0), stream_seed(1, 1));
        assert_eq!(base_seed(Some(42)), 42);
    }
}
