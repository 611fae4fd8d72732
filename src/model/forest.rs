//! Random-forest model: configuration and high-level wrapper.

use bon::Builder;
use ndarray::{Array2, ArrayView2};

use crate::repr::{DistributionLeaf, Forest};
use crate::training::{ForestParams, ForestTrainer, MaxFeatures, Verbosity};
use crate::utils::run_with_threads;

use super::gbdt::argmax_columns;
use super::meta::ModelMeta;
use super::{validate_training_inputs, ConfigError, TrainError};

// =============================================================================
// ForestConfig
// =============================================================================

/// Configuration for random-forest training.
///
/// # Example
///
/// ```
/// use groves::model::ForestConfig;
/// use groves::training::MaxFeatures;
///
/// let config = ForestConfig::builder().build().unwrap();
/// assert_eq!(config.n_trees, 300);
///
/// let config = ForestConfig::builder()
///     .n_trees(50)
///     .max_features(MaxFeatures::All)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    /// Number of trees. Default: 300.
    #[builder(default = 300)]
    pub n_trees: u32,

    /// Maximum tree depth. Default: 12.
    #[builder(default = 12)]
    pub max_depth: u32,

    /// Candidate features per split. Default: `Sqrt`.
    #[builder(default)]
    pub max_features: MaxFeatures,

    /// Minimum rows required to attempt a split. Default: 2.
    #[builder(default = 2)]
    pub min_samples_split: u32,

    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the tree count is zero or
    /// `min_samples_split` is below 2.
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidTreeCount);
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidMinSamplesSplit(self.min_samples_split));
        }
        Ok(())
    }

    /// Convert to trainer params.
    fn to_trainer_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            max_features: self.max_features,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
            verbosity: self.verbosity,
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// ForestModel
// =============================================================================

/// High-level random-forest classifier.
pub struct ForestModel {
    forest: Forest<DistributionLeaf>,
    meta: ModelMeta,
    config: ForestConfig,
}

impl ForestModel {
    /// Train a new forest.
    ///
    /// `features` is feature-major `[n_features, n_samples]`; `labels` are
    /// encoded class codes. `n_threads`: 0 = auto, 1 = sequential, >1 =
    /// exact count; trees are independent and train in parallel.
    pub fn train<'a>(
        features: ArrayView2<'a, f32>,
        labels: &'a [u32],
        config: ForestConfig,
        n_threads: usize,
    ) -> Result<Self, TrainError> {
        let n_classes = validate_training_inputs(features.ncols(), labels)?;

        let trainer = ForestTrainer::new(n_classes, config.to_trainer_params());
        let forest = run_with_threads(n_threads, |parallelism| {
            trainer.train(features, labels, parallelism)
        });

        let meta = ModelMeta::new(features.nrows(), n_classes);
        Ok(Self { forest, meta, config })
    }

    /// Create a model from a forest and metadata (e.g. a loaded artifact).
    pub fn from_forest(forest: Forest<DistributionLeaf>, meta: ModelMeta) -> Self {
        Self {
            forest,
            meta,
            config: ForestConfig::default(),
        }
    }

    /// Get reference to the underlying forest.
    pub fn forest(&self) -> &Forest<DistributionLeaf> {
        &self.forest
    }

    /// Get reference to model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Get reference to training configuration.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Set feature names on the metadata.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.meta.feature_names = Some(names);
        self
    }

    /// Predict class probabilities, `[n_classes, n_samples]`.
    pub fn predict_proba(&self, features: ArrayView2<f32>) -> Array2<f32> {
        self.forest.predict_proba(features)
    }

    /// Predict class codes (argmax over averaged leaf distributions).
    pub fn predict(&self, features: ArrayView2<f32>) -> Vec<u32> {
        let probs = self.forest.predict_proba(features);
        argmax_columns(&probs)
    }
}

impl std::fmt::Debug for ForestModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForestModel")
            .field("n_trees", &self.forest.n_trees())
            .field("n_features", &self.meta.n_features)
            .field("n_classes", &self.meta.n_classes)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
