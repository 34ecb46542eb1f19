use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the coin flips that drive level promotion on insertion.
///
/// The list owns its flip source instead of reaching for a process-wide
/// generator, so promotion decisions can be made reproducible by seeding or
/// scripting the source.
pub trait CoinFlip {
    fn flip(&mut self) -> bool;
}

/// PRNG-backed coin. Fair by default; the success probability can be tuned
/// the same way an upgrade probability tunes a geometric height distribution.
pub struct RandomCoin {
    rng_: StdRng,
    probability_: f64,
}

impl RandomCoin {
    /// Entropy-seeded fair coin.
    pub fn new() -> RandomCoin {
        RandomCoin {
            rng_: StdRng::from_entropy(),
            probability_: 0.5,
        }
    }

    /// Fair coin with a fixed seed. Two coins built from the same seed
    /// produce the same flip sequence.
    pub fn seeded(seed: u64) -> RandomCoin {
        RandomCoin {
            rng_: StdRng::seed_from_u64(seed),
            probability_: 0.5,
        }
    }

    /// Seeded coin that lands heads with the given probability.
    pub fn biased(seed: u64, probability: f64) -> RandomCoin {
        assert!(probability > 0.0);
        assert!(probability < 1.0);

        RandomCoin {
            rng_: StdRng::seed_from_u64(seed),
            probability_: probability,
        }
    }
}

impl Default for RandomCoin {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl CoinFlip for RandomCoin {
    fn flip(&mut self) -> bool {
        self.rng_.gen::<f64>() < self.probability_
    }
}

/// Replays a fixed flip sequence, then answers tails forever. Makes the level
/// structure produced by a sequence of insertions fully predictable.
pub struct ScriptedCoin {
    flips_: VecDeque<bool>,
}

impl ScriptedCoin {
    pub fn new<I>(flips: I) -> ScriptedCoin
    where
        I: IntoIterator<Item = bool>,
    {
        ScriptedCoin {
            flips_: flips.into_iter().collect(),
        }
    }
}

impl CoinFlip for ScriptedCoin {
    fn flip(&mut self) -> bool {
        self.flips_.pop_front().unwrap_or(false)
    }
}
