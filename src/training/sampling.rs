//! Row and column sampling for training.
//!
//! All samplers are driven by [`Xoshiro256PlusPlus`] seeded from the
//! configured training seed, so a fixed seed reproduces the same trees
//! across runs.

use rand::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Seed-mixing constants for deriving per-tree/per-round streams.
const MIX_A: u64 = 0x9E3779B97F4A7C15;
const MIX_B: u64 = 0x517CC1B727220A95;

/// Derive a per-tree seed from the root seed and tree/round indices.
#[inline]
pub fn derive_seed(seed: u64, a: u64, b: u64) -> u64 {
    seed.wrapping_add(a.wrapping_mul(MIX_A))
        .wrapping_add(b.wrapping_mul(MIX_B))
}

/// Sample `k` items from `0..n` without replacement.
///
/// Partial Fisher-Yates shuffle; returns sorted indices for cache-friendly
/// access.
pub fn sample_without_replacement(
    n: u32,
    k: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Vec<u32> {
    let k = k.min(n as usize);
    let mut indices: Vec<u32> = (0..n).collect();

    for i in 0..k {
        let j = rng.gen_range(i..n as usize);
        indices.swap(i, j);
    }

    let mut sampled: Vec<u32> = indices[..k].to_vec();
    sampled.sort_unstable();
    sampled
}

// ============================================================================
// RowSampler
// ============================================================================

/// Uniform row subsampling without replacement, one draw per tree.
///
/// A ratio of 1.0 disables sampling (returns `None` so callers can take the
/// all-rows fast path).
#[derive(Debug, Clone)]
pub struct RowSampler {
    n_rows: usize,
    ratio: f32,
    seed: u64,
}

impl RowSampler {
    /// Create a row sampler.
    ///
    /// # Panics
    ///
    /// Panics if `ratio` is not in (0, 1].
    pub fn new(n_rows: usize, ratio: f32, seed: u64) -> Self {
        assert!(ratio > 0.0 && ratio <= 1.0, "subsample must be in (0, 1]");
        Self { n_rows, ratio, seed }
    }

    /// Returns true if subsampling is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.ratio < 1.0
    }

    /// Draw the row set for one tree. `None` means "all rows".
    pub fn sample(&self, round: usize, group: usize) -> Option<Vec<u32>> {
        if !self.is_enabled() {
            return None;
        }

        let k = ((self.n_rows as f32 * self.ratio).ceil() as usize).max(1);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(derive_seed(
            self.seed,
            round as u64,
            group as u64,
        ));
        Some(sample_without_replacement(self.n_rows as u32, k, &mut rng))
    }
}

// ============================================================================
// BootstrapSampler
// ============================================================================

/// Bootstrap sampling (with replacement) for bagged forests.
///
/// Draws `n_rows` rows with replacement, so roughly 63% of distinct rows
/// appear in each tree's sample, many more than once.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapSampler {
    n_rows: usize,
}

impl BootstrapSampler {
    /// Create a bootstrap sampler over `n_rows` rows.
    pub fn new(n_rows: usize) -> Self {
        Self { n_rows }
    }

    /// Draw one bootstrap sample using the caller's RNG stream.
    pub fn sample(&self, rng: &mut Xoshiro256PlusPlus) -> Vec<u32> {
        (0..self.n_rows)
            .map(|_| rng.gen_range(0..self.n_rows) as u32)
            .collect()
    }
}

// ============================================================================
// ColumnSampler
// ============================================================================

/// Per-tree feature subsampling.
#[derive(Debug, Clone)]
pub struct ColumnSampler {
    n_features: u32,
    colsample_bytree: f32,
}

impl ColumnSampler {
    /// Create a column sampler.
    ///
    /// # Panics
    ///
    /// Panics if the ratio is not in (0, 1].
    pub fn new(n_features: u32, colsample_bytree: f32) -> Self {
        assert!(
            colsample_bytree > 0.0 && colsample_bytree <= 1.0,
            "colsample_bytree must be in (0, 1]"
        );
        Self { n_features, colsample_bytree }
    }

    /// Returns true if column sampling is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.colsample_bytree < 1.0
    }

    /// Sample the feature set for one tree.
    pub fn sample_for_tree(&self, tree_seed: u64) -> Vec<u32> {
        if !self.is_enabled() {
            return (0..self.n_features).collect();
        }

        let k = ((self.n_features as f32 * self.colsample_bytree).ceil() as usize).max(1);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(tree_seed);
        sample_without_replacement(self.n_features, k, &mut rng)
    }
}

// ============================================================================
// Tests
// ============================================================================
