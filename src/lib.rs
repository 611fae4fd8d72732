//! groves: tree-ensemble training for tabular classification.
//!
//! Loads a labeled CSV dataset, standardizes features, encodes labels, fits
//! a random forest and a gradient-boosted tree ensemble, and persists the
//! four fitted artifacts under version-suffixed file names.
//!
//! # Key Types
//!
//! - [`Pipeline`] / [`PipelineConfig`] - The end-to-end training procedure
//! - [`ForestModel`] / [`GbdtModel`] - High-level models with train/predict
//! - [`ForestConfig`] / [`GbdtConfig`] - Configuration builders
//! - [`StandardScaler`] / [`LabelEncoder`] - Fitted preprocessing transforms
//! - [`Dataset`] - Data handling
//! - [`ArtifactStore`] - Versioned artifact persistence
//!
//! # Training
//!
//! Use `PipelineConfig::builder()` to configure, then `Pipeline::run()` for
//! the whole procedure; or train the models directly via
//! `ForestModel::train()` / `GbdtModel::train()`.

pub mod data;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod preprocess;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Pipeline (most users want this)
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, TrainingReport};

// High-level model types
pub use model::{ConfigError, ForestConfig, ForestModel, GbdtConfig, GbdtModel, ModelMeta, TrainError};

// Preprocessing
pub use preprocess::{LabelEncoder, PreprocessError, StandardScaler};

// Data types
pub use data::{read_csv, Dataset, DatasetBuilder, DatasetError, DatasetSchema};

// Persistence
pub use persist::ArtifactStore;

// Training verbosity control
pub use training::Verbosity;

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
