//! Seeded random number generation for permutations and rarefaction.

use std::collections::HashSet;

/// Simple deterministic random number generator (xorshift64).
///
/// Each consumer owns its own generator seeded from configuration, so
/// randomized steps are reproducible and require no synchronization
/// between workers.
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create a new generator from a seed.
    pub fn new(seed: u64) -> Self {
        // xorshift state must be nonzero
        let state = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state }
    }

    /// Next pseudo-random value.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform value in `0..bound`.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let n = slice.len();
        for i in (1..n).rev() {
            let j = self.next_below(i as u64 + 1) as usize;
            slice.swap(i, j);
        }
    }

    /// Draw `k` distinct values from `0..n` without replacement.
    ///
    /// Uses Floyd's algorithm, so memory is proportional to `k` rather
    /// than `n`. The result is unsorted.
    pub fn sample_without_replacement(&mut self, n: u64, k: usize) -> Vec<u64> {
        debug_assert!(k as u64 <= n);
        let mut chosen: HashSet<u64> = HashSet::with_capacity(k);
        for j in (n - k as u64)..n {
            let candidate = self.next_below(j + 1);
            if !chosen.insert(candidate) {
                chosen.insert(j);
            }
        }
        chosen.into_iter().collect()
    }
}
