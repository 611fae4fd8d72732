//! Random-forest trainer.
//!
//! Bagging: each tree trains on a bootstrap sample with per-split feature
//! subsampling, and prediction averages the trees' leaf distributions.
//! Trees are independent, so they train in parallel; each tree's RNG stream
//! is derived from the root seed and the tree index, which keeps results
//! identical regardless of thread scheduling.

use ndarray::ArrayView2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::repr::{DistributionLeaf, Forest};
use crate::training::sampling::{derive_seed, BootstrapSampler};
use crate::training::{TrainingLogger, Verbosity};
use crate::utils::Parallelism;

use super::builder::{GiniParams, GiniTreeBuilder};

// =============================================================================
// MaxFeatures
// =============================================================================

/// How many candidate features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))` — the usual classification default.
    #[default]
    Sqrt,
    /// All features (no subsampling).
    All,
    /// A fixed count (clamped to `n_features`).
    Count(u32),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `n_features`.
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            Self::All => n_features,
            Self::Count(n) => n as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

// =============================================================================
// ForestParams
// =============================================================================

/// Parameters for random-forest training.
#[derive(Debug, Clone)]
pub struct ForestParams {
    /// Number of trees.
    pub n_trees: u32,
    /// Maximum tree depth.
    pub max_depth: u32,
    /// Candidate features per split.
    pub max_features: MaxFeatures,
    /// Minimum rows required to attempt a split.
    pub min_samples_split: u32,
    /// Random seed.
    pub seed: u64,
    /// Verbosity level for training output.
    pub verbosity: Verbosity,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            seed: 42,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// ForestTrainer
// =============================================================================

/// Trainer for a bagged forest of Gini decision trees.
pub struct ForestTrainer {
    n_classes: usize,
    params: ForestParams,
}

impl ForestTrainer {
    /// Create a trainer for `n_classes` classes.
    pub fn new(n_classes: usize, params: ForestParams) -> Self {
        Self { n_classes, params }
    }

    /// Get reference to parameters.
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Train a forest.
    ///
    /// `features` is feature-major `[n_features, n_samples]`; `labels` are
    /// class codes, one per sample. Inputs are expected pre-validated by the
    /// model layer.
    pub fn train<'a>(
        &self,
        features: ArrayView2<'a, f32>,
        labels: &'a [u32],
        parallelism: Parallelism,
    ) -> Forest<DistributionLeaf> {
        let n_rows = features.ncols();
        debug_assert_eq!(labels.len(), n_rows);
        debug_assert!(labels.iter().all(|&l| (l as usize) < self.n_classes));

        let logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training("random forest", self.params.n_trees as usize);

        let gini_params = GiniParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split as usize,
            n_candidate_features: self.params.max_features.resolve(features.nrows()),
        };
        let bootstrap = BootstrapSampler::new(n_rows);

        let trees = parallelism.maybe_par_map(0..self.params.n_trees as u64, |t| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(derive_seed(self.params.seed, t, 0));
            let rows = bootstrap.sample(&mut rng);
            GiniTreeBuilder::new(features, labels, self.n_classes, gini_params.clone(), rng)
                .build(&rows)
        });

        let mut forest = Forest::new(self.n_classes as u32);
        for tree in trees {
            forest.push_tree(tree, 0);
        }
        forest
    }
}

// =============================================================================
// Tests
// =============================================================================
