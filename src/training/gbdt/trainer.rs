//! Gradient boosting trainer.
//!
//! Orchestrates objective computation, tree growing, and prediction updates:
//! each round computes softmax gradients for every class, grows one tree per
//! class on the sampled rows/columns, and accumulates the shrunken leaf
//! weights into the margin matrix.

use ndarray::{Array2, ArrayView2};

use crate::repr::{Forest, ScalarLeaf};
use crate::training::sampling::{derive_seed, ColumnSampler, RowSampler};
use crate::training::{Gradients, SoftmaxLoss, TrainingLogger, Verbosity};

use super::grower::{GrowerParams, TreeGrower};

// =============================================================================
// GbdtParams
// =============================================================================

/// Parameters for gradient-boosted tree training.
#[derive(Debug, Clone)]
pub struct GbdtParams {
    /// Number of boosting rounds (one tree per class per round).
    pub n_rounds: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,
    /// Maximum tree depth.
    pub max_depth: u32,
    /// L2 regularization on leaf weights.
    pub reg_lambda: f32,
    /// Minimum hessian sum per child.
    pub min_child_weight: f32,
    /// Minimum gain to keep a split.
    pub min_split_gain: f32,
    /// Row subsampling ratio per tree, in (0, 1].
    pub subsample: f32,
    /// Feature subsampling ratio per tree, in (0, 1].
    pub colsample_bytree: f32,
    /// Random seed.
    pub seed: u64,
    /// Verbosity level for training output.
    pub verbosity: Verbosity,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            min_split_gain: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            seed: 42,
            verbosity: Verbosity::default(),
        }
    }
}

impl GbdtParams {
    fn grower_params(&self) -> GrowerParams {
        GrowerParams {
            max_depth: self.max_depth,
            learning_rate: self.learning_rate,
            reg_lambda: self.reg_lambda,
            min_child_weight: self.min_child_weight,
            min_split_gain: self.min_split_gain,
        }
    }
}

// =============================================================================
// GbdtTrainer
// =============================================================================

/// Trainer for a multi-class boosted forest.
pub struct GbdtTrainer {
    objective: SoftmaxLoss,
    params: GbdtParams,
}

impl GbdtTrainer {
    /// Create a trainer for `n_classes` classes.
    pub fn new(n_classes: usize, params: GbdtParams) -> Self {
        Self {
            objective: SoftmaxLoss::new(n_classes),
            params,
        }
    }

    /// Get reference to parameters.
    pub fn params(&self) -> &GbdtParams {
        &self.params
    }

    /// Train a boosted forest.
    ///
    /// `features` is feature-major `[n_features, n_samples]`; `labels` are
    /// class codes, one per sample. Inputs are expected pre-validated (the
    /// model layer checks shapes and label ranges); only debug-asserted
    /// here.
    pub fn train(&self, features: ArrayView2<f32>, labels: &[u32]) -> Forest<ScalarLeaf> {
        let n_rows = features.ncols();
        let n_features = features.nrows();
        let k = self.objective.n_outputs();

        debug_assert_eq!(labels.len(), n_rows);
        debug_assert!(labels.iter().all(|&l| (l as usize) < k));

        let logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training("gradient boosted trees", (self.params.n_rounds as usize) * k);

        let mut base_scores = vec![0.0f32; k];
        self.objective.compute_base_score(labels, &mut base_scores);

        // Margins [n_classes, n_samples], initialized to base scores
        let mut margins = Array2::zeros((k, n_rows));
        for (c, &base) in base_scores.iter().enumerate() {
            margins.row_mut(c).fill(base);
        }

        let mut forest = Forest::new(k as u32).with_base_score(base_scores);
        let mut gradients = Gradients::new(n_rows, k);

        let row_sampler = RowSampler::new(n_rows, self.params.subsample, self.params.seed);
        let col_sampler = ColumnSampler::new(n_features as u32, self.params.colsample_bytree);

        let grower_params = self.params.grower_params();
        let all_rows: Vec<u32> = (0..n_rows as u32).collect();

        for round in 0..self.params.n_rounds as usize {
            self.objective.compute_gradients(
                n_rows,
                margins.as_slice().expect("margins are contiguous"),
                labels,
                gradients.pairs_mut(),
            );

            for group in 0..k {
                // Even/odd stream split keeps row and column draws independent
                let sampled = row_sampler.sample(2 * round, group);
                let rows = sampled.as_deref().unwrap_or(&all_rows);
                let col_seed =
                    derive_seed(self.params.seed, 2 * round as u64 + 1, group as u64);
                let columns = col_sampler.sample_for_tree(col_seed);

                let grad_hess = gradients.output_pairs(group);
                let mut grower = TreeGrower::new(features.view(), grad_hess, &grower_params);
                let tree = grower.grow(rows, &columns);

                // Trees trained on a subset still apply to all rows
                let mut margin_row = margins.row_mut(group);
                for s in 0..n_rows {
                    let leaf = tree.traverse_to_leaf(features.column(s));
                    margin_row[s] += tree.leaf_value(leaf).0;
                }

                forest.push_tree(tree, group as u32);
            }

            logger.round(round, self.params.n_rounds as usize);
        }

        forest
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Two well-separated clusters in one feature.
    fn toy_data() -> (ndarray::Array2<f32>, Vec<u32>) {
        let features = array![
            [0.1f32, 0.2, 0.3, 0.4, 5.1, 5.2, 5.3, 5.4],
            [1.0, 1.1, 0.9, 1.0, 1.0, 0.9, 1.1, 1.0],
        ];
        let labels = vec![0u32, 0, 0, 0, 1, 1, 1, 1];
        (features, labels)
    }

    #[test]
    fn trains_expected_tree_count() {
        let (features, labels) = toy_data();
        let params = GbdtParams { n_rounds: 5, ..Default::default() };
        let trainer = GbdtTrainer::new(2, params);

        let forest = trainer.train(features.view(), &labels);

        assert_eq!(forest.n_trees(), 10); // 5 rounds x 2 classes
        assert_eq!(forest.n_groups(), 2);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn separable_data_is_fit() {
        let (features, labels) = toy_data();
        let params = GbdtParams {
            n_rounds: 20,
            learning_rate: 0.3,
            max_depth: 2,
            ..Default::default()
        };
        let trainer = GbdtTrainer::new(2, params);
        let forest = trainer.train(features.view(), &labels);

        let margins = forest.predict_margins(features.view());
        for (s, &label) in labels.iter().enumerate() {
            let predicted = if margins[[1, s]] > margins[[0, s]] { 1 } else { 0 };
            assert_eq!(predicted, label, "sample {s} misclassified");
        }
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let (features, labels) = toy_data();
        let params = GbdtParams {
            n_rounds: 8,
            subsample: 0.9,
            colsample_bytree: 0.9,
            seed: 42,
            ..Default::default()
        };

        let a = GbdtTrainer::new(2, params.clone()).train(features.view(), &labels);
        let b = GbdtTrainer::new(2, params).train(features.view(), &labels);

        assert_eq!(
            a.predict_margins(features.view()),
            b.predict_margins(features.view())
        );
    }

    #[test]
    fn base_scores_reflect_class_priors() {
        let (features, labels) = toy_data();
        let params = GbdtParams { n_rounds: 1, ..Default::default() };
        let forest = GbdtTrainer::new(2, params).train(features.view(), &labels);

        // Balanced classes: both base scores are ln(0.5)
        let expected = (0.5f64).ln() as f32;
        assert!((forest.base_score()[0] - expected).abs() < 1e-5);
        assert!((forest.base_score()[1] - expected).abs() < 1e-5);
    }

    #[test]
    fn three_class_training() {
        let features = array![[0.0f32, 0.1, 0.2, 5.0, 5.1, 5.2, 10.0, 10.1, 10.2]];
        let labels = vec![0u32, 0, 0, 1, 1, 1, 2, 2, 2];
        // Softmax hessians on 9 samples are tiny; relax the child-weight floor
        let params = GbdtParams {
            n_rounds: 15,
            max_depth: 3,
            min_child_weight: 0.1,
            ..Default::default()
        };

        let forest = GbdtTrainer::new(3, params).train(features.view(), &labels);
        assert_eq!(forest.n_groups(), 3);
        assert_eq!(forest.n_trees(), 45);

        let margins = forest.predict_margins(features.view());
        for (s, &label) in labels.iter().enumerate() {
            let mut best = 0;
            for c in 1..3 {
                if margins[[c, s]] > margins[[best, s]] {
                    best = c;
                }
            }
            assert_eq!(best as u32, label, "sample {s} misclassified");
        }
    }
}
