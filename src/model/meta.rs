//! Model metadata.

use serde::{Deserialize, Serialize};

/// Shared metadata for trained models.
///
/// Carries the training context needed to sanity-check inputs at prediction
/// time and to make persisted artifacts self-describing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Number of input features.
    pub n_features: usize,
    /// Number of classes.
    pub n_classes: usize,
    /// Feature names (optional).
    pub feature_names: Option<Vec<String>>,
}

impl ModelMeta {
    /// Create metadata for a classifier.
    pub fn new(n_features: usize, n_classes: usize) -> Self {
        Self {
            n_features,
            n_classes,
            feature_names: None,
        }
    }

    /// Set feature names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }
}
