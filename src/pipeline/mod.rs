//! The end-to-end training pipeline.
//!
//! [`Pipeline::run`] executes the whole procedure in order: load the CSV,
//! validate the label column, split features from labels, fit the scaler and
//! label encoder, train both ensemble models on the transformed data, and
//! persist the four artifacts. Any failure at any step aborts the run; there
//! are no retries and no partial-state cleanup.

use std::path::{Path, PathBuf};

use bon::Builder;

use crate::data::{read_csv, DatasetError};
use crate::model::{ForestConfig, ForestModel, GbdtConfig, GbdtModel, TrainError};
use crate::persist::{ArtifactStore, SerializeError};
use crate::preprocess::{LabelEncoder, PreprocessError, StandardScaler};
use crate::training::{TrainingLogger, Verbosity};

// =============================================================================
// PipelineError
// =============================================================================

/// Errors from any stage of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("preprocessing error: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("training error: {0}")]
    Train(#[from] TrainError),

    #[error("artifact error: {0}")]
    Persist(#[from] SerializeError),
}

// =============================================================================
// PipelineConfig
// =============================================================================

/// Configuration for one pipeline run.
///
/// # Example
///
/// ```no_run
/// use groves::pipeline::{Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .data_path("data.csv")
///     .model_dir("models")
///     .build();
///
/// let report = Pipeline::new(config).run().unwrap();
/// println!("saved {} artifacts", report.artifact_paths().len());
/// ```
#[derive(Debug, Clone, Builder)]
pub struct PipelineConfig {
    /// Path of the input CSV file.
    #[builder(into)]
    pub data_path: PathBuf,

    /// Directory the artifacts are written to (created if absent).
    #[builder(into)]
    pub model_dir: PathBuf,

    /// Version tag used in artifact file names. Default: `"1"`.
    #[builder(into, default = "1".to_string())]
    pub version: String,

    /// Name of the label column. Default: `"label"`.
    #[builder(into, default = "label".to_string())]
    pub label_column: String,

    /// Random-forest configuration.
    #[builder(default)]
    pub forest: ForestConfig,

    /// Boosted-tree configuration.
    #[builder(default)]
    pub gbdt: GbdtConfig,

    /// Pipeline console verbosity. Default: `Info`.
    #[builder(default = Verbosity::Info)]
    pub verbosity: Verbosity,

    /// Thread count for forest training: 0 = auto, 1 = sequential.
    #[builder(default = 0)]
    pub n_threads: usize,
}

// =============================================================================
// TrainingReport
// =============================================================================

/// Summary of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Number of training samples.
    pub n_samples: usize,
    /// Number of features.
    pub n_features: usize,
    /// Number of distinct classes.
    pub n_classes: usize,
    /// Random-forest accuracy on the training set.
    pub forest_train_accuracy: f32,
    /// Boosted-tree accuracy on the training set.
    pub gbdt_train_accuracy: f32,
    /// Written random-forest artifact.
    pub forest_path: PathBuf,
    /// Written boosted-tree artifact.
    pub gbdt_path: PathBuf,
    /// Written scaler artifact.
    pub scaler_path: PathBuf,
    /// Written label-encoder artifact.
    pub encoder_path: PathBuf,
}

impl TrainingReport {
    /// The four artifact paths, in banner order.
    pub fn artifact_paths(&self) -> [&Path; 4] {
        [
            self.forest_path.as_path(),
            self.gbdt_path.as_path(),
            self.scaler_path.as_path(),
            self.encoder_path.as_path(),
        ]
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// The sequential training pipeline.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from its configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline to completion.
    ///
    /// Steps, in order: load CSV (validating the label column), fit scaler
    /// and transform features, fit encoder and encode labels, train the
    /// random forest, train the boosted trees, save all four artifacts.
    ///
    /// # Errors
    ///
    /// Any stage error aborts the run. A missing label column fails before
    /// any fitting occurs and before any file is created.
    pub fn run(&self) -> Result<TrainingReport, PipelineError> {
        let logger = TrainingLogger::new(self.config.verbosity);

        logger.info("Loading data...");
        let dataset = read_csv(&self.config.data_path, &self.config.label_column)?;
        let raw_labels = dataset
            .labels()
            .expect("datasets read from CSV always carry labels");
        let feature_names = dataset.schema().feature_names().to_vec();

        logger.info("Scaling features + encoding labels...");
        let (scaler, scaled) = StandardScaler::fit_transform(dataset.features());
        let encoder = LabelEncoder::fit(raw_labels);
        let codes = encoder.encode(raw_labels)?;

        logger.info("Training random forest...");
        let forest_model = ForestModel::train(
            scaled.view(),
            &codes,
            self.config.forest.clone(),
            self.config.n_threads,
        )?
        .with_feature_names(feature_names.clone());
        let forest_train_accuracy = accuracy(&forest_model.predict(scaled.view()), &codes);

        logger.info("Training gradient boosted trees...");
        let gbdt_model = GbdtModel::train(scaled.view(), &codes, self.config.gbdt.clone())?
            .with_feature_names(feature_names);
        let gbdt_train_accuracy = accuracy(&gbdt_model.predict(scaled.view()), &codes);

        logger.info("Saving artifacts...");
        let store = ArtifactStore::new(&self.config.model_dir, &self.config.version);
        for path in store.existing_paths() {
            logger.warn(&format!("overwriting existing artifact {}", path.display()));
        }

        let forest_path = store.save_forest(&forest_model)?;
        let gbdt_path = store.save_gbdt(&gbdt_model)?;
        let scaler_path = store.save_scaler(&scaler)?;
        let encoder_path = store.save_encoder(&encoder)?;

        Ok(TrainingReport {
            n_samples: dataset.n_samples(),
            n_features: dataset.n_features(),
            n_classes: encoder.n_classes(),
            forest_train_accuracy,
            gbdt_train_accuracy,
            forest_path,
            gbdt_path,
            scaler_path,
            encoder_path,
        })
    }
}

/// Fraction of predictions matching the labels.
fn accuracy(predictions: &[u32], labels: &[u32]) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels.iter())
        .filter(|(p, l)| p == l)
        .count();
    correct as f32 / labels.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_matches() {
        assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn config_defaults() {
        let config = PipelineConfig::builder()
            .data_path("data.csv")
            .model_dir("models")
            .build();

        assert_eq!(config.version, "1");
        assert_eq!(config.label_column, "label");
        assert_eq!(config.verbosity, Verbosity::Info);
        assert_eq!(config.forest.n_trees, 300);
        assert_eq!(config.gbdt.n_rounds, 300);
    }
}
