//! Canonical tree-ensemble representation.
//!
//! - [`Tree`]: immutable structure-of-arrays node storage, generic over the
//!   leaf payload
//! - [`ScalarLeaf`]: additive leaf weight (boosted trees)
//! - [`DistributionLeaf`]: per-class probability vector (random forest)
//! - [`Forest`]: a collection of trees with group assignments and base scores

mod forest;
mod leaf;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use leaf::{DistributionLeaf, Leaf, ScalarLeaf};
pub use tree::{Tree, TreeValidationError};

/// Node identifier within a single tree (0 = root).
pub type NodeId = u32;
