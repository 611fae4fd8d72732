//! Forest representation (collection of trees).

use ndarray::{Array2, ArrayView2};

use super::leaf::{DistributionLeaf, Leaf, ScalarLeaf};
use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    TreeGroupsLenMismatch { n_trees: usize, len: usize },
    TreeGroupOutOfRange { tree_idx: usize, group: u32, n_groups: u32 },
    InvalidTree { tree_idx: usize, error: TreeValidationError },
}

/// Forest of decision trees.
///
/// Stores trees with per-tree group assignments. Boosted forests put one
/// tree per output group per round and sum scalar leaves into the group's
/// margin. Bagged forests put every tree in group 0 and use `n_groups` as
/// the class count, averaging distribution leaves.
#[derive(Debug, Clone)]
pub struct Forest<L: Leaf> {
    trees: Vec<Tree<L>>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    base_score: Vec<f32>,
}

impl<L: Leaf> Forest<L> {
    /// Create a new forest with the given number of output groups.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    /// Set the base score for all groups.
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Self {
        debug_assert_eq!(base_score.len(), self.n_groups as usize);
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree<L>, group: u32) {
        debug_assert!(group < self.n_groups, "group out of range");
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    /// Base score for each group.
    #[inline]
    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree<L> {
        &self.trees[idx]
    }

    /// All tree group assignments.
    #[inline]
    pub fn tree_groups(&self) -> &[u32] {
        &self.tree_groups
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree<L>> {
        self.trees.iter()
    }

    /// Iterate over trees with their group assignments.
    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree<L>, u32)> {
        self.trees
            .iter()
            .zip(self.tree_groups.iter())
            .map(|(t, &g)| (t, g))
    }

    /// Validate structural invariants (trees, groups, base score).
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }
        if self.tree_groups.len() != self.trees.len() {
            return Err(ForestValidationError::TreeGroupsLenMismatch {
                n_trees: self.trees.len(),
                len: self.tree_groups.len(),
            });
        }

        for (i, &g) in self.tree_groups.iter().enumerate() {
            if g >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx: i,
                    group: g,
                    n_groups: self.n_groups,
                });
            }
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }

        Ok(())
    }
}

/// Prediction for boosted forests (scalar leaves).
impl Forest<ScalarLeaf> {
    /// Predict raw margin scores for a batch.
    ///
    /// `features` is feature-major `[n_features, n_samples]`. Returns
    /// `[n_groups, n_samples]`: base scores plus the sum of each tree's leaf
    /// weight in its group.
    pub fn predict_margins(&self, features: ArrayView2<f32>) -> Array2<f32> {
        let n_samples = features.ncols();
        let n_groups = self.n_groups as usize;

        let mut output = Array2::zeros((n_groups, n_samples));
        for (g, &base) in self.base_score.iter().enumerate() {
            output.row_mut(g).fill(base);
        }

        for (tree, group) in self.trees_with_groups() {
            let mut row = output.row_mut(group as usize);
            for s in 0..n_samples {
                let leaf = tree.traverse_to_leaf(features.column(s));
                row[s] += tree.leaf_value(leaf).0;
            }
        }

        output
    }
}

/// Prediction for bagged forests (distribution leaves).
impl Forest<DistributionLeaf> {
    /// Predict class probabilities for a batch.
    ///
    /// `features` is feature-major `[n_features, n_samples]`. Returns
    /// `[n_classes, n_samples]`: the mean of the reached leaves'
    /// distributions over all trees.
    pub fn predict_proba(&self, features: ArrayView2<f32>) -> Array2<f32> {
        let n_samples = features.ncols();
        let n_classes = self.n_groups as usize;

        let mut output = Array2::zeros((n_classes, n_samples));
        if self.trees.is_empty() {
            return output;
        }

        for tree in self.trees() {
            for s in 0..n_samples {
                let leaf = tree.traverse_to_leaf(features.column(s));
                let dist = tree.leaf_value(leaf);
                debug_assert_eq!(dist.n_classes(), n_classes);
                for (c, &p) in dist.0.iter().enumerate() {
                    output[[c, s]] += p;
                }
            }
        }

        let scale = 1.0 / self.trees.len() as f32;
        output.mapv_inplace(|x| x * scale);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn scalar_stump(threshold: f32, left: f32, right: f32) -> Tree<ScalarLeaf> {
        Tree::new(
            vec![0, 0, 0],
            vec![threshold, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![ScalarLeaf(0.0), ScalarLeaf(left), ScalarLeaf(right)],
        )
    }

    fn dist_stump(threshold: f32, left: &[f32], right: &[f32]) -> Tree<DistributionLeaf> {
        let filler = DistributionLeaf(vec![0.0; left.len()].into_boxed_slice());
        Tree::new(
            vec![0, 0, 0],
            vec![threshold, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![
                filler,
                DistributionLeaf(left.to_vec().into_boxed_slice()),
                DistributionLeaf(right.to_vec().into_boxed_slice()),
            ],
        )
    }

    #[test]
    fn scalar_forest_sums_trees() {
        let mut forest = Forest::new(1).with_base_score(vec![0.5]);
        forest.push_tree(scalar_stump(0.5, 1.0, 2.0), 0);
        forest.push_tree(scalar_stump(0.5, 0.25, 0.75), 0);

        let features = array![[0.3f32, 0.7]];
        let margins = forest.predict_margins(features.view());

        assert_abs_diff_eq!(margins[[0, 0]], 0.5 + 1.0 + 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(margins[[0, 1]], 0.5 + 2.0 + 0.75, epsilon = 1e-6);
    }

    #[test]
    fn scalar_forest_multigroup() {
        let mut forest = Forest::new(2).with_base_score(vec![0.0, 0.0]);
        forest.push_tree(scalar_stump(0.5, 1.0, 2.0), 0);
        forest.push_tree(scalar_stump(0.5, 3.0, 4.0), 1);

        let features = array![[0.0f32]];
        let margins = forest.predict_margins(features.view());

        assert_abs_diff_eq!(margins[[0, 0]], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(margins[[1, 0]], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn distribution_forest_averages() {
        let mut forest = Forest::new(2);
        forest.push_tree(dist_stump(0.5, &[1.0, 0.0], &[0.0, 1.0]), 0);
        forest.push_tree(dist_stump(0.5, &[0.5, 0.5], &[0.0, 1.0]), 0);

        let features = array![[0.0f32, 1.0]];
        let probs = forest.predict_proba(features.view());

        // Sample 0 goes left in both trees: mean of [1,0] and [0.5,0.5]
        assert_abs_diff_eq!(probs[[0, 0]], 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(probs[[1, 0]], 0.25, epsilon = 1e-6);
        // Sample 1 goes right in both: [0,1]
        assert_abs_diff_eq!(probs[[1, 1]], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn validate_catches_group_out_of_range() {
        let mut forest = Forest::new(1);
        forest.trees.push(scalar_stump(0.5, 1.0, 2.0));
        forest.tree_groups.push(3);

        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::TreeGroupOutOfRange { group: 3, .. })
        ));
    }

    #[test]
    fn validate_ok() {
        let mut forest = Forest::new(1);
        forest.push_tree(scalar_stump(0.5, 1.0, 2.0), 0);
        assert!(forest.validate().is_ok());
    }
}
