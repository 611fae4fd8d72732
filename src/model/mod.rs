//! High-level model APIs: configuration builders and trained models.
//!
//! [`ForestModel`] and [`GbdtModel`] wrap the trainers with input
//! validation, metadata, and probability/argmax prediction. Configurations
//! use the `bon` builder pattern with validation at build time.

mod forest;
mod gbdt;
mod meta;

pub use forest::{ForestConfig, ForestModel};
pub use gbdt::{GbdtConfig, GbdtModel};
pub use meta::ModelMeta;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Learning rate must be positive.
    InvalidLearningRate(f32),
    /// Tree/round count must be at least 1.
    InvalidTreeCount,
    /// Invalid sampling ratio (must be in (0, 1]).
    InvalidSamplingRatio { field: &'static str, value: f32 },
    /// Invalid regularization parameter (must be non-negative).
    InvalidRegularization { field: &'static str, value: f32 },
    /// `min_samples_split` must be at least 2.
    InvalidMinSamplesSplit(u32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLearningRate(v) => {
                write!(f, "learning_rate must be positive, got {}", v)
            }
            Self::InvalidTreeCount => write!(f, "tree count must be at least 1"),
            Self::InvalidSamplingRatio { field, value } => {
                write!(f, "{} must be in (0, 1], got {}", field, value)
            }
            Self::InvalidRegularization { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
            Self::InvalidMinSamplesSplit(v) => {
                write!(f, "min_samples_split must be at least 2, got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// TrainError
// =============================================================================

/// Errors from training a model on invalid inputs.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    #[error("label count mismatch: {expected} samples, {got} labels")]
    LabelLengthMismatch { expected: usize, got: usize },

    #[error("training requires at least 2 distinct classes, got {0}")]
    TooFewClasses(usize),
}

/// Derive the class count from encoded labels.
///
/// Codes are assumed contiguous from 0 (the label encoder guarantees this).
pub(crate) fn infer_n_classes(labels: &[u32]) -> usize {
    labels.iter().map(|&l| l as usize + 1).max().unwrap_or(0)
}

/// Validate (features, labels) agreement shared by both models.
pub(crate) fn validate_training_inputs(
    n_samples: usize,
    labels: &[u32],
) -> Result<usize, TrainError> {
    if n_samples == 0 {
        return Err(TrainError::EmptyDataset);
    }
    if labels.len() != n_samples {
        return Err(TrainError::LabelLengthMismatch {
            expected: n_samples,
            got: labels.len(),
        });
    }

    let n_classes = infer_n_classes(labels);
    if n_classes < 2 {
        return Err(TrainError::TooFewClasses(n_classes));
    }
    Ok(n_classes)
}
