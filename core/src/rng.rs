//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a `RandomSource` handed to the engine
//! at construction. Production code uses `SeededRng`; tests may inject
//! a scripted source to force specific outcomes.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The injectable random provider.
pub trait RandomSource: Send {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n).
    fn next_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        ((self.next_f64() * n as f64) as u64).min(n - 1)
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// PCG-backed source seeded from the session seed.
pub struct SeededRng {
    inner: Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        let derived_seed = seed ^ 0x9e37_79b9_7f4a_7c15;
        Self { inner: Pcg64Mcg::seed_from_u64(derived_seed) }
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}
