//! Gradient-boosted tree model: configuration and high-level wrapper.

use bon::Builder;
use ndarray::{Array2, ArrayView2};

use crate::repr::{Forest, ScalarLeaf};
use crate::training::{GbdtParams, GbdtTrainer, SoftmaxLoss, Verbosity};

use super::meta::ModelMeta;
use super::{validate_training_inputs, ConfigError, TrainError};

// =============================================================================
// GbdtConfig
// =============================================================================

/// Configuration for gradient-boosted tree training.
///
/// # Example
///
/// ```
/// use groves::model::GbdtConfig;
///
/// // All defaults
/// let config = GbdtConfig::builder().build().unwrap();
/// assert_eq!(config.n_rounds, 300);
///
/// // Customized
/// let config = GbdtConfig::builder()
///     .n_rounds(50)
///     .learning_rate(0.3)
///     .max_depth(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GbdtConfig {
    /// Number of boosting rounds (one tree per class per round).
    /// Default: 300.
    #[builder(default = 300)]
    pub n_rounds: u32,

    /// Learning rate (shrinkage). Default: 0.1.
    #[builder(default = 0.1)]
    pub learning_rate: f32,

    /// Maximum tree depth. Default: 6.
    #[builder(default = 6)]
    pub max_depth: u32,

    /// L2 regularization on leaf weights. Default: 1.0.
    #[builder(default = 1.0)]
    pub reg_lambda: f32,

    /// Minimum hessian sum per child. Default: 1.0.
    #[builder(default = 1.0)]
    pub min_child_weight: f32,

    /// Minimum gain to keep a split. Default: 0.0.
    #[builder(default = 0.0)]
    pub min_split_gain: f32,

    /// Row subsampling ratio per tree. Default: 0.9.
    #[builder(default = 0.9)]
    pub subsample: f32,

    /// Feature subsampling ratio per tree. Default: 0.9.
    #[builder(default = 0.9)]
    pub colsample_bytree: f32,

    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: gbdt_config_builder::IsComplete> GbdtConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the learning rate is non-positive, the
    /// round count is zero, a sampling ratio is outside (0, 1], or a
    /// regularization parameter is negative.
    pub fn build(self) -> Result<GbdtConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GbdtConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_rounds == 0 {
            return Err(ConfigError::InvalidTreeCount);
        }

        for (field, value) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidSamplingRatio { field, value });
            }
        }

        for (field, value) in [
            ("reg_lambda", self.reg_lambda),
            ("min_child_weight", self.min_child_weight),
            ("min_split_gain", self.min_split_gain),
        ] {
            if value < 0.0 {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }

        Ok(())
    }

    /// Convert to trainer params.
    fn to_trainer_params(&self) -> GbdtParams {
        GbdtParams {
            n_rounds: self.n_rounds,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            reg_lambda: self.reg_lambda,
            min_child_weight: self.min_child_weight,
            min_split_gain: self.min_split_gain,
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            seed: self.seed,
            verbosity: self.verbosity,
        }
    }
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// GbdtModel
// =============================================================================

/// High-level gradient-boosted tree classifier.
pub struct GbdtModel {
    forest: Forest<ScalarLeaf>,
    meta: ModelMeta,
    config: GbdtConfig,
}

impl GbdtModel {
    /// Train a new boosted model.
    ///
    /// `features` is feature-major `[n_features, n_samples]`; `labels` are
    /// encoded class codes.
    pub fn train(
        features: ArrayView2<f32>,
        labels: &[u32],
        config: GbdtConfig,
    ) -> Result<Self, TrainError> {
        let n_classes = validate_training_inputs(features.ncols(), labels)?;

        let trainer = GbdtTrainer::new(n_classes, config.to_trainer_params());
        let forest = trainer.train(features, labels);

        let meta = ModelMeta::new(features.nrows(), n_classes);
        Ok(Self { forest, meta, config })
    }

    /// Create a model from a forest and metadata (e.g. a loaded artifact).
    ///
    /// Uses the default config; for new models prefer [`GbdtModel::train`].
    pub fn from_forest(forest: Forest<ScalarLeaf>, meta: ModelMeta) -> Self {
        Self {
            forest,
            meta,
            config: GbdtConfig::default(),
        }
    }

    /// Get reference to the underlying forest.
    pub fn forest(&self) -> &Forest<ScalarLeaf> {
        &self.forest
    }

    /// Get reference to model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Get reference to training configuration.
    pub fn config(&self) -> &GbdtConfig {
        &self.config
    }

    /// Set feature names on the metadata.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.meta.feature_names = Some(names);
        self
    }

    /// Predict class probabilities, `[n_classes, n_samples]`.
    pub fn predict_proba(&self, features: ArrayView2<f32>) -> Array2<f32> {
        let mut margins = self.forest.predict_margins(features);
        SoftmaxLoss::new(self.meta.n_classes).transform_predictions(margins.view_mut());
        margins
    }

    /// Predict class codes (argmax over probabilities).
    pub fn predict(&self, features: ArrayView2<f32>) -> Vec<u32> {
        let margins = self.forest.predict_margins(features);
        argmax_columns(&margins)
    }
}

impl std::fmt::Debug for GbdtModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GbdtModel")
            .field("n_trees", &self.forest.n_trees())
            .field("n_features", &self.meta.n_features)
            .field("n_classes", &self.meta.n_classes)
            .finish()
    }
}

/// Argmax over each column of a `[n_classes, n_samples]` score matrix.
pub(crate) fn argmax_columns(scores: &Array2<f32>) -> Vec<u32> {
    (0..scores.ncols())
        .map(|s| {
            let mut best = 0usize;
            for c in 1..scores.nrows() {
                if scores[[c, s]] > scores[[best, s]] {
                    best = c;
                }
            }
            best as u32
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn toy_data() -> (ndarray::Array2<f32>, Vec<u32>) {
        let features = array![
            [0.1f32, 0.2, 0.3, 0.4, 5.1, 5.2, 5.3, 5.4],
            [1.0, 1.1, 0.9, 1.0, 1.0, 0.9, 1.1, 1.0],
        ];
        let labels = vec![0u32, 0, 0, 0, 1, 1, 1, 1];
        (features, labels)
    }

    fn quick_config() -> GbdtConfig {
        GbdtConfig::builder()
            .n_rounds(20)
            .learning_rate(0.3)
            .max_depth(3)
            .build()
            .unwrap()
    }

    #[test]
    fn default_config_matches_published_hyperparameters() {
        let config = GbdtConfig::default();
        assert_eq!(config.n_rounds, 300);
        assert_eq!(config.max_depth, 6);
        assert_abs_diff_eq!(config.learning_rate, 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(config.subsample, 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(config.colsample_bytree, 0.9, epsilon = 1e-6);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn invalid_learning_rate() {
        let result = GbdtConfig::builder().learning_rate(0.0).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn invalid_round_count() {
        let result = GbdtConfig::builder().n_rounds(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidTreeCount)));
    }

    #[test]
    fn invalid_subsample() {
        let result = GbdtConfig::builder().subsample(1.5).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSamplingRatio { field: "subsample", .. })
        ));
    }

    #[test]
    fn invalid_regularization() {
        let result = GbdtConfig::builder().reg_lambda(-1.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegularization { field: "reg_lambda", .. })
        ));
    }

    #[test]
    fn train_and_predict() {
        let (features, labels) = toy_data();
        let model = GbdtModel::train(features.view(), &labels, quick_config()).unwrap();

        assert_eq!(model.meta().n_features, 2);
        assert_eq!(model.meta().n_classes, 2);
        assert_eq!(model.forest().n_trees(), 40);

        let predictions = model.predict(features.view());
        assert_eq!(predictions, labels);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (features, labels) = toy_data();
        let model = GbdtModel::train(features.view(), &labels, quick_config()).unwrap();

        let probs = model.predict_proba(features.view());
        for s in 0..features.ncols() {
            let sum: f32 = (0..2).map(|c| probs[[c, s]]).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn train_rejects_empty() {
        let features = Array2::<f32>::zeros((2, 0));
        let result = GbdtModel::train(features.view(), &[], GbdtConfig::default());
        assert!(matches!(result, Err(TrainError::EmptyDataset)));
    }

    #[test]
    fn train_rejects_label_mismatch() {
        let (features, _) = toy_data();
        let result = GbdtModel::train(features.view(), &[0, 1], GbdtConfig::default());
        assert!(matches!(result, Err(TrainError::LabelLengthMismatch { .. })));
    }

    #[test]
    fn argmax_picks_largest_per_column() {
        let scores = array![[0.1f32, 0.9], [0.8, 0.05], [0.1, 0.05]];
        assert_eq!(argmax_columns(&scores), vec![1, 0]);
    }
}
