//! Depth-wise tree grower for gradient boosting.
//!
//! Grows one regression tree on (gradient, hessian) pairs using exact greedy
//! split search: per node, each candidate feature's values are sorted and
//! scanned for the threshold with the best gain.

use ndarray::ArrayView2;

use crate::repr::{ScalarLeaf, Tree};
use crate::training::GradsTuple;

/// Gain and structure parameters for the grower.
#[derive(Debug, Clone)]
pub struct GrowerParams {
    /// Maximum tree depth (root = depth 0).
    pub max_depth: u32,
    /// Shrinkage applied to leaf weights.
    pub learning_rate: f32,
    /// L2 regularization on leaf weights.
    pub reg_lambda: f32,
    /// Minimum hessian sum required in each child.
    pub min_child_weight: f32,
    /// Minimum gain required to keep a split.
    pub min_split_gain: f32,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            learning_rate: 0.3,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            min_split_gain: 0.0,
        }
    }
}

/// Best split found for a node, if any.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: u32,
    threshold: f32,
    gain: f32,
}

/// Grows a single tree over a row subset and feature subset.
pub struct TreeGrower<'a> {
    /// Feature matrix `[n_features, n_samples]`.
    features: ArrayView2<'a, f32>,
    /// Gradient pairs for the output group being grown, indexed by sample.
    grad_hess: &'a [GradsTuple],
    params: &'a GrowerParams,
    /// Scratch for sorting (value, sample) pairs during split search.
    scratch: Vec<(f32, u32)>,
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
    leaf_values: Vec<ScalarLeaf>,
}

impl TreeArrays {
    /// Append a placeholder node; children and payload are patched later.
    fn alloc(&mut self) -> u32 {
        let id = self.split_indices.len() as u32;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        self.is_leaf.push(true);
        self.leaf_values.push(ScalarLeaf(0.0));
        id
    }
}

impl<'a> TreeGrower<'a> {
    pub fn new(
        features: ArrayView2<'a, f32>,
        grad_hess: &'a [GradsTuple],
        params: &'a GrowerParams,
    ) -> Self {
        debug_assert_eq!(features.ncols(), grad_hess.len());
        Self {
            features,
            grad_hess,
            params,
            scratch: Vec::new(),
        }
    }

    /// Grow one tree over the given rows, considering only `columns` for
    /// splits. `rows` may contain duplicates (bootstrap callers).
    pub fn grow(&mut self, rows: &[u32], columns: &[u32]) -> Tree<ScalarLeaf> {
        let mut arrays = TreeArrays::default();
        self.build_node(&mut arrays, rows, columns, 0);

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

    /// Recursively build the node for `rows`, returning its id.
    ///
    /// Parents are allocated before children, so child ids are always
    /// greater than the parent's (the forward-progress invariant of
    /// [`Tree::validate`]).
    fn build_node(
        &mut self,
        arrays: &mut TreeArrays,
        rows: &[u32],
        columns: &[u32],
        depth: u32,
    ) -> u32 {
        let node = arrays.alloc();

        let (grad_sum, hess_sum) = self.sums(rows);

        let splittable = depth < self.params.max_depth
            && rows.len() >= 2
            && hess_sum >= 2.0 * self.params.min_child_weight as f64;

        let best = if splittable {
            self.find_best_split(rows, columns, grad_sum, hess_sum)
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

                let left = self.build_node(arrays, &left_rows, columns, depth + 1);
                let right = self.build_node(arrays, &right_rows, columns, depth + 1);

                arrays.left_children[node as usize] = left;
                arrays.right_children[node as usize] = right;
            }
            None => {
                arrays.leaf_values[node as usize] = ScalarLeaf(self.leaf_weight(grad_sum, hess_sum));
            }
        }

        node
    }

    /// Gradient and hessian totals over a row set.
    fn sums(&self, rows: &[u32]) -> (f64, f64) {
        let mut grad = 0.0f64;
        let mut hess = 0.0f64;
        for &r in rows {
            let gh = self.grad_hess[r as usize];
            grad += gh.grad as f64;
            hess += gh.hess as f64;
        }
        (grad, hess)
    }

    /// Newton-step leaf weight with shrinkage: `-lr * G / (H + lambda)`.
    fn leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        (-self.params.learning_rate as f64 * grad_sum
            / (hess_sum + self.params.reg_lambda as f64)) as f32
    }

    /// Half of the score a row set contributes: `G^2 / (H + lambda)`.
    #[inline]
    fn score(&self, grad: f64, hess: f64) -> f64 {
        grad * grad / (hess + self.params.reg_lambda as f64)
    }

    /// Exact greedy split search over the candidate features.
    fn find_best_split(
        &mut self,
        rows: &[u32],
        columns: &[u32],
        grad_sum: f64,
        hess_sum: f64,
    ) -> Option<SplitCandidate> {
        let parent_score = self.score(grad_sum, hess_sum);
        let mut best: Option<SplitCandidate> = None;

        for &feature in columns {
            // Rows with NaN always route left; fold their grads into the
            // left side of every candidate.
            let mut nan_grad = 0.0f64;
            let mut nan_hess = 0.0f64;

            self.scratch.clear();
            for &r in rows {
                let v = self.features[[feature as usize, r as usize]];
                if v.is_nan() {
                    let gh = self.grad_hess[r as usize];
                    nan_grad += gh.grad as f64;
                    nan_hess += gh.hess as f64;
                } else {
                    self.scratch.push((v, r));
                }
            }

            if self.scratch.len() < 2 {
                continue;
            }

            self.scratch
                .sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).expect("no NaN after filter"));

            let mut left_grad = nan_grad;
            let mut left_hess = nan_hess;

            for i in 0..self.scratch.len() - 1 {
                let (value, r) = self.scratch[i];
                let gh = self.grad_hess[r as usize];
                left_grad += gh.grad as f64;
                left_hess += gh.hess as f64;

                let next_value = self.scratch[i + 1].0;
                if next_value <= value {
                    // No threshold separates equal values
                    continue;
                }

                let right_grad = grad_sum - left_grad;
                let right_hess = hess_sum - left_hess;

                if left_hess < self.params.min_child_weight as f64
                    || right_hess < self.params.min_child_weight as f64
                {
                    continue;
                }

                let gain = 0.5
                    * (self.score(left_grad, left_hess) + self.score(right_grad, right_hess)
                        - parent_score);

                if gain <= self.params.min_split_gain as f64 {
                    continue;
                }

                if best.map_or(true, |b| gain > b.gain as f64) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: midpoint(value, next_value),
                        gain: gain as f32,
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
