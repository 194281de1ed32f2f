use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of bounded uniform noise for the weather model.
pub trait RandomSource: Send {
    /// Uniform draw in `[low, high)`. Returns `low` when the range is empty.
    fn uniform(&mut self, low: f32, high: f32) -> f32;
}

impl<R: Rng + Send> RandomSource for R {
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        self.gen::<f32>() * (high - low) + low
    }
}

/// Builds the process generator: fixed seed when given, wall clock otherwise.
pub fn seeded_rng(seed: Option<u64>) -> (ChaCha8Rng, u64) {
    let seed = seed.unwrap_or_else(wall_clock_seed);
    (ChaCha8Rng::seed_from_u64(seed), seed)
}

fn wall_clock_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .map(|nanos| nanos as u64)
        .unwrap_or_else(|| now.timestamp() as u64)
}
