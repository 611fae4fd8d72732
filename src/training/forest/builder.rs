//! Gini-impurity decision tree builder for bagged forests.

use ndarray::ArrayView2;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::repr::{DistributionLeaf, Tree};
use crate::training::sampling::sample_without_replacement;

/// Structure parameters for a single forest tree.
#[derive(Debug, Clone)]
pub struct GiniParams {
    /// Maximum tree depth (root = depth 0).
    pub max_depth: u32,
    /// Minimum rows required to attempt a split.
    pub min_samples_split: usize,
    /// Candidate features drawn per split.
    pub n_candidate_features: usize,
}

/// Minimum impurity decrease to accept a split.
const MIN_DECREASE: f64 = 1e-7;

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: u32,
    threshold: f32,
    decrease: f64,
}

/// SoA arrays under construction.
#[derive(Default)]
struct TreeArrays {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<DistributionLeaf>,
}

impl TreeArrays {
    fn alloc(&mut self, n_classes: usize) -> u32 {
        let id = self.split_indices.len() as u32;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        self.is_leaf.push(true);
        self.leaf_values
            .push(DistributionLeaf(vec![0.0; n_classes].into_boxed_slice()));
        id
    }
}

/// Builds one decision tree over a (bootstrap) row sample.
///
/// Each split draws its own candidate feature subset from the tree's RNG
/// stream, so a tree is fully determined by its seed.
pub struct GiniTreeBuilder<'a> {
    /// Feature matrix `[n_features, n_samples]`.
    features: ArrayView2<'a, f32>,
    /// Class codes, one per sample.
    labels: &'a [u32],
    n_classes: usize,
    params: GiniParams,
    rng: Xoshiro256PlusPlus,
    scratch: Vec<(f32, u32)>,
}

impl<'a> GiniTreeBuilder<'a> {
    pub fn new(
        features: ArrayView2<'a, f32>,
        labels: &'a [u32],
        n_classes: usize,
        params: GiniParams,
        rng: Xoshiro256PlusPlus,
    ) -> Self {
        debug_assert_eq!(features.ncols(), labels.len());
        Self {
            features,
            labels,
            n_classes,
            params,
            rng,
            scratch: Vec::new(),
        }
    }

    /// Build the tree over `rows` (duplicates allowed — bootstrap sample).
    pub fn build(mut self, rows: &[u32]) -> Tree<DistributionLeaf> {
        let mut arrays = TreeArrays::default();
        self.build_node(&mut arrays, rows, 0);

        Tree::new(
            arrays.split_indices,
            arrays.split_thresholds,
            arrays.left_children,
            arrays.right_children,
            arrays.default_left,
            arrays.is_leaf,
            arrays.leaf_values,
        )
    }

    fn build_node(&mut self, arrays: &mut TreeArrays, rows: &[u32], depth: u32) -> u32 {
        let node = arrays.alloc(self.n_classes);

        let counts = self.class_counts(rows);
        let n_present = counts.iter().filter(|&&c| c > 0.0).count();

        let splittable = depth < self.params.max_depth
            && rows.len() >= self.params.min_samples_split
            && n_present > 1;

        let best = if splittable {
            self.find_best_split(rows, &counts)
        } else {
            None
        };

        match best {
            Some(split) => {
                arrays.split_indices[node as usize] = split.feature;
                arrays.split_thresholds[node as usize] = split.threshold;
                arrays.is_leaf[node as usize] = false;

                let (left_rows, right_rows) =
                    self.partition(rows, split.feature, split.threshold);

                let left = self.build_node(arrays, &left_rows, depth + 1);
                let right = self.build_node(arrays, &right_rows, depth + 1);

                arrays.left_children[node as usize] = left;
                arrays.right_children[node as usize] = right;
            }
            None => {
                arrays.leaf_values[node as usize] = DistributionLeaf::from_counts(&counts);
            }
        }

        node
    }

    /// Per-class row counts (bootstrap multiplicity counts).
    fn class_counts(&self, rows: &[u32]) -> Vec<f32> {
        let mut counts = vec![0.0f32; self.n_classes];
        for &r in rows {
            counts[self.labels[r as usize] as usize] += 1.0;
        }
        counts
    }

    /// Best Gini split over a fresh random feature subset.
    fn find_best_split(&mut self, rows: &[u32], counts: &[f32]) -> Option<SplitCandidate> {
        let n_features = self.features.nrows() as u32;
        let candidates = sample_without_replacement(
            n_features,
            self.params.n_candidate_features,
            &mut self.rng,
        );

        let total: f64 = counts.iter().map(|&c| c as f64).sum();
        let parent_impurity = gini(counts.iter().map(|&c| c as f64), total);

        let mut best: Option<SplitCandidate> = None;
        let mut left_counts = vec![0.0f64; self.n_classes];

        for &feature in &candidates {
            // NaN rows always route left; their counts seed the left side.
            left_counts.fill(0.0);
            let mut n_left_base = 0.0f64;

            self.scratch.clear();
            for &r in rows {
                let v = self.features[[feature as usize, r as usize]];
                if v.is_nan() {
                    left_counts[self.labels[r as usize] as usize] += 1.0;
                    n_left_base += 1.0;
                } else {
                    self.scratch.push((v, r));
                }
            }

            if self.scratch.len() < 2 {
                continue;
            }

            self.scratch
                .sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).expect("no NaN after filter"));

            let mut n_left = n_left_base;

            for i in 0..self.scratch.len() - 1 {
                let (value, r) = self.scratch[i];
                left_counts[self.labels[r as usize] as usize] += 1.0;
                n_left += 1.0;

                let next_value = self.scratch[i + 1].0;
                if next_value <= value {
                    continue;
                }

                let n_right = total - n_left;
                if n_left == 0.0 || n_right == 0.0 {
                    continue;
                }

                let left_impurity = gini(left_counts.iter().copied(), n_left);
                let right_impurity = gini(
                    counts
                        .iter()
                        .zip(left_counts.iter())
                        .map(|(&c, &l)| c as f64 - l),
                    n_right,
                );

                let decrease = parent_impurity
                    - (n_left / total) * left_impurity
                    - (n_right / total) * right_impurity;

                if decrease <= MIN_DECREASE {
                    continue;
                }

                if best.map_or(true, |b| decrease > b.decrease) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: midpoint(value, next_value),
                        decrease,
                    });
                }
            }
        }

        best
    }

    /// Split rows by `feature < threshold` (NaN goes left).
    fn partition(&self, rows: &[u32], feature: u32, threshold: f32) -> (Vec<u32>, Vec<u32>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &r in rows {
            let v = self.features[[feature as usize, r as usize]];
            if v.is_nan() || v < threshold {
                left.push(r);
            } else {
                right.push(r);
            }
        }
        (left, right)
    }
}

/// Gini impurity: `1 - sum((n_c / n)^2)`.
#[inline]
fn gini(counts: impl Iterator<Item = f64>, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = counts.map(|c| (c / total) * (c / total)).sum();
    1.0 - sum_sq
}

/// Midpoint of two adjacent distinct values, guarded against rounding back
/// onto the lower value.
#[inline]
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo + (hi - lo) * 0.5;
    if mid > lo {
        mid
    } else {
        hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn params(max_depth: u32) -> GiniParams {
        GiniParams {
            max_depth,
            min_samples_split: 2,
            n_candidate_features: 8,
        }
    }

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn pure_node_becomes_leaf() {
        let features = array![[1.0f32, 2.0, 3.0]];
        let labels = vec![1u32, 1, 1];

        let builder = GiniTreeBuilder::new(features.view(), &labels, 2, params(5), rng(42));
        let tree = builder.build(&[0, 1, 2]);

        assert_eq!(tree.n_nodes(), 1);
        assert!(tree.is_leaf(0));
        assert_eq!(tree.leaf_value(0).0.as_ref(), &[0.0, 1.0]);
    }

    #[test]
    fn separable_classes_split_cleanly() {
        let features = array![[0.0f32, 0.1, 0.2, 5.0, 5.1, 5.2]];
        let labels = vec![0u32, 0, 0, 1, 1, 1];

        let builder = GiniTreeBuilder::new(features.view(), &labels, 2, params(4), rng(42));
        let tree = builder.build(&[0, 1, 2, 3, 4, 5]);

        assert!(tree.validate().is_ok());
        assert!(!tree.is_leaf(0));

        // Both classes are recovered perfectly
        for (s, &label) in labels.iter().enumerate() {
            let leaf = tree.traverse_to_leaf(features.column(s));
            let dist = tree.leaf_value(leaf);
            assert_eq!(dist.0[label as usize], 1.0);
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        let features = array![[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]];
        let labels = vec![0u32, 1, 0, 1, 0, 1, 0, 1];

        let builder = GiniTreeBuilder::new(features.view(), &labels, 2, params(1), rng(42));
        let tree = builder.build(&[0, 1, 2, 3, 4, 5, 6, 7]);

        // Depth 1: at most a root split with two leaves
        assert!(tree.n_nodes() <= 3);
    }

    #[test]
    fn bootstrap_duplicates_weight_counts() {
        let features = array![[1.0f32, 2.0]];
        let labels = vec![0u32, 1];

        // Row 0 drawn three times, row 1 once
        let builder = GiniTreeBuilder::new(features.view(), &labels, 2, params(0), rng(42));
        let tree = builder.build(&[0, 0, 0, 1]);

        assert!(tree.is_leaf(0));
        assert_eq!(tree.leaf_value(0).0.as_ref(), &[0.75, 0.25]);
    }

    #[test]
    fn same_seed_same_tree() {
        let features = array![
            [0.3f32, 1.7, 0.9, 4.2, 3.8, 2.5, 0.1, 3.3],
            [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
        ];
        let labels = vec![0u32, 1, 0, 1, 1, 0, 0, 1];
        let rows: Vec<u32> = (0..8).collect();

        let p = GiniParams {
            max_depth: 4,
            min_samples_split: 2,
            n_candidate_features: 1,
        };

        let a = GiniTreeBuilder::new(features.view(), &labels, 2, p.clone(), rng(7)).build(&rows);
        let b = GiniTreeBuilder::new(features.view(), &labels, 2, p, rng(7)).build(&rows);

        assert_eq!(a.n_nodes(), b.n_nodes());
        for s in 0..8 {
            assert_eq!(
                a.traverse_to_leaf(features.column(s)),
                b.traverse_to_leaf(features.column(s))
            );
        }
    }
}
