//! Fitted preprocessing transforms.
//!
//! - [`StandardScaler`]: per-feature standardization (zero mean, unit
//!   variance) with learned statistics that can be re-applied at inference
//!   time
//! - [`LabelEncoder`]: bijective mapping between raw label values and
//!   integer class codes
//!
//! Both transforms are fit once, never mutated afterwards, and serialize
//! through [`persist`](crate::persist) alongside the trained models.

mod encoder;
mod scaler;

pub use encoder::LabelEncoder;
pub use scaler::StandardScaler;

/// Errors from fitting or applying preprocessing transforms.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("transform has not been fitted on any data")]
    NotFitted,

    #[error("feature count mismatch: fitted on {fitted}, got {got}")]
    DimensionMismatch { fitted: usize, got: usize },

    #[error("unknown label '{0}' was not present during fitting")]
    UnknownLabel(String),

    #[error("class code {code} out of range for {n_classes} classes")]
    InvalidCode { code: u32, n_classes: usize },
}
