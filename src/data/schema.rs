//! Dataset schema: feature names and label metadata.

/// Schema describing the columns of a [`Dataset`](super::Dataset).
///
/// Holds one name per feature column, in feature order, plus the name of the
/// label column when the dataset carries labels. Names come from the CSV
/// header (or from [`DatasetBuilder`](super::DatasetBuilder) calls) and are
/// persisted alongside fitted models for later inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSchema {
    feature_names: Vec<String>,
    label_name: Option<String>,
}

impl DatasetSchema {
    /// Create a schema from feature names.
    pub fn new(feature_names: Vec<String>) -> Self {
        Self { feature_names, label_name: None }
    }

    /// Create a schema with generated names (`f0`, `f1`, ...).
    pub fn unnamed(n_features: usize) -> Self {
        Self::new((0..n_features).map(|i| format!("f{i}")).collect())
    }

    /// Set the label column name.
    pub fn with_label_name(mut self, name: &str) -> Self {
        self.label_name = Some(name.to_string());
        self
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Feature names in feature order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Name of a single feature.
    pub fn feature_name(&self, idx: usize) -> &str {
        &self.feature_names[idx]
    }

    /// Label column name, if the dataset carries labels.
    pub fn label_name(&self) -> Option<&str> {
        self.label_name.as_deref()
    }

    /// Index of a feature by name.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}
