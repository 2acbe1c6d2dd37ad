//! The single seedable random source threaded through a run.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

pub type ExamRng = Xoshiro256StarStar;

/// Build the run's random source from a numeric seed.
#[must_use]
pub fn seeded(seed: u64) -> ExamRng {
    ExamRng::seed_from_u64(seed)
}
