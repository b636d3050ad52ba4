//! Deterministic random number generation for demo and test batches.
//!
//! RULE: Nothing here may call a platform RNG. Every stream is
//! derived from an explicit seed so a batch can be regenerated exactly.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct BatchRng {
    inner: Pcg64Mcg,
}

impl BatchRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let i = self.next_u64_below(items.len() as u64) as usize;
        &items[i]
    }
}
