//! Dataset container and builder.

use ndarray::{Array2, ArrayView1, ArrayView2};

use super::error::DatasetError;
use super::schema::DatasetSchema;

/// The labeled tabular dataset consumed by the trainers.
///
/// # Storage Layout
///
/// Features are stored in **feature-major** layout: `[n_features, n_samples]`.
/// Each feature's values across all samples are contiguous in memory, which
/// is what the split-finding code wants.
///
/// Labels, when present, are the raw (unencoded) values of the label column.
/// Encoding to integer codes is the job of
/// [`LabelEncoder`](crate::preprocess::LabelEncoder).
///
/// # Construction
///
/// Use [`read_csv`](super::read_csv) for files, [`Dataset::new`] for
/// feature-major matrices, or [`Dataset::builder`] for column-by-column
/// assembly.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature data: `[n_features, n_samples]` (feature-major).
    features: Array2<f32>,
    /// Column metadata.
    schema: DatasetSchema,
    /// Raw label values, one per sample.
    labels: Option<Vec<String>>,
}

impl Dataset {
    /// Create a dataset from a feature-major matrix.
    ///
    /// # Panics
    ///
    /// Debug-asserts that the label count matches the sample count.
    pub fn new(features: ArrayView2<f32>, labels: Option<Vec<String>>) -> Self {
        let n_samples = features.ncols();
        let n_features = features.nrows();

        if let Some(ref l) = labels {
            debug_assert_eq!(
                l.len(),
                n_samples,
                "labels must have same sample count as features"
            );
        }

        Self {
            features: features.to_owned(),
            schema: DatasetSchema::unnamed(n_features),
            labels,
        }
    }

    /// Create a builder for column-by-column construction.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    /// Get the schema.
    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    /// Check if the dataset carries labels.
    pub fn has_labels(&self) -> bool {
        self.labels.is_some()
    }

    /// View of the feature matrix, `[n_features, n_samples]`.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// View of a single feature column across all samples.
    pub fn feature(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.features.row(idx)
    }

    /// Raw label values, if present.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    // =========================================================================
    // Builder-style methods
    // =========================================================================

    /// Set the schema.
    ///
    /// # Panics
    ///
    /// Debug-asserts that the schema has the same number of features.
    pub fn with_schema(mut self, schema: DatasetSchema) -> Self {
        debug_assert_eq!(
            schema.n_features(),
            self.n_features(),
            "schema must have same number of features"
        );
        self.schema = schema;
        self
    }
}

/// Builder for column-by-column dataset construction.
///
/// # Example
///
/// ```
/// use groves::data::DatasetBuilder;
/// use ndarray::array;
///
/// let ds = DatasetBuilder::new()
///     .add_feature("a", array![1.0, 3.0, 5.0].view())
///     .add_feature("b", array![2.0, 4.0, 6.0].view())
///     .labels(vec!["cat".into(), "dog".into(), "cat".into()])
///     .build()
///     .unwrap();
///
/// assert_eq!(ds.n_features(), 2);
/// assert_eq!(ds.n_samples(), 3);
/// ```
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Vec<f32>>,
    names: Vec<String>,
    labels: Option<Vec<String>>,
    label_name: Option<String>,
}

impl DatasetBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named feature column.
    pub fn add_feature(mut self, name: &str, values: ArrayView1<f32>) -> Self {
        self.columns.push(values.to_vec());
        self.names.push(name.to_string());
        self
    }

    /// Add a named feature column from a `Vec`.
    pub fn add_feature_vec(mut self, name: &str, values: Vec<f32>) -> Self {
        self.columns.push(values);
        self.names.push(name.to_string());
        self
    }

    /// Set raw label values.
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Set the label column name recorded in the schema.
    pub fn label_name(mut self, name: &str) -> Self {
        self.label_name = Some(name.to_string());
        self
    }

    /// Build the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if no features were provided, if columns have
    /// inconsistent lengths, or if the label count doesn't match.
    pub fn build(self) -> Result<Dataset, DatasetError> {
        if self.columns.is_empty() {
            return Err(DatasetError::EmptyFeatures);
        }

        let n_samples = self.columns[0].len();
        let n_features = self.columns.len();

        for col in &self.columns {
            if col.len() != n_samples {
                return Err(DatasetError::ShapeMismatch {
                    expected: n_samples,
                    got: col.len(),
                    field: "features",
                });
            }
        }

        if let Some(ref labels) = self.labels {
            if labels.len() != n_samples {
                return Err(DatasetError::ShapeMismatch {
                    expected: n_samples,
                    got: labels.len(),
                    field: "labels",
                });
            }
        }

        // Build feature matrix [n_features, n_samples]
        let mut features = Array2::zeros((n_features, n_samples));
        for (i, col) in self.columns.into_iter().enumerate() {
            features
                .row_mut(i)
                .assign(&ndarray::ArrayView1::from(&col[..]));
        }

        let mut schema = DatasetSchema::new(self.names);
        if let Some(name) = self.label_name {
            schema = schema.with_label_name(&name);
        }

        Ok(Dataset { features, schema, labels: self.labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn dataset_new() {
        // Feature-major [n_features, n_samples]: 2 features, 3 samples
        let features = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let labels = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let ds = Dataset::new(features.view(), Some(labels));

        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert!(ds.has_labels());
        assert_eq!(ds.feature(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ds.feature(1).to_vec(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn dataset_features_only() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        let ds = Dataset::new(features.view(), None);

        assert_eq!(ds.n_samples(), 2);
        assert!(!ds.has_labels());
        assert!(ds.labels().is_none());
    }

    #[test]
    fn builder_basic() {
        let ds = DatasetBuilder::new()
            .add_feature("x", array![1.0, 2.0, 3.0].view())
            .add_feature("y", array![4.0, 5.0, 6.0].view())
            .labels(vec!["p".into(), "q".into(), "p".into()])
            .label_name("label")
            .build()
            .unwrap();

        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.schema().feature_names(), &["x", "y"]);
        assert_eq!(ds.schema().label_name(), Some("label"));
    }

    #[test]
    fn builder_empty_features_error() {
        let result = DatasetBuilder::new().labels(vec!["a".into()]).build();
        assert!(matches!(result, Err(DatasetError::EmptyFeatures)));
    }

    #[test]
    fn builder_shape_mismatch_error() {
        let result = DatasetBuilder::new()
            .add_feature("x", array![1.0, 2.0, 3.0].view())
            .add_feature("y", array![4.0, 5.0].view())
            .build();
        assert!(matches!(result, Err(DatasetError::ShapeMismatch { .. })));
    }

    #[test]
    fn builder_label_mismatch_error() {
        let result = DatasetBuilder::new()
            .add_feature("x", array![1.0, 2.0, 3.0].view())
            .labels(vec!["a".into(), "b".into()])
            .build();
        assert!(matches!(result, Err(DatasetError::ShapeMismatch { .. })));
    }

    // Verify Send + Sync
    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn dataset_is_send_sync() {
        assert_send_sync::<Dataset>();
        assert_send_sync::<DatasetBuilder>();
    }
}
