//! Per-feature standardization.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::PreprocessError;

/// Standardizes features to zero mean and unit variance.
///
/// Statistics are learned once from training data with [`fit`](Self::fit)
/// and retained for reuse, so the same transform can be applied to future
/// data. Variance uses the population formula (divide by `n`), and features
/// with zero variance are centered only — the divisor is clamped to 1.0 so
/// constant columns map to 0 instead of NaN.
///
/// All matrices are feature-major: `[n_features, n_samples]`.
///
/// # Example
///
/// ```
/// use groves::preprocess::StandardScaler;
/// use ndarray::array;
///
/// let data = array![[1.0f32, 3.0, 5.0]]; // one feature, three samples
/// let scaler = StandardScaler::fit(data.view());
/// let scaled = scaler.transform(data.view()).unwrap();
///
/// assert!((scaled[[0, 1]]).abs() < 1e-6); // mean maps to 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl StandardScaler {
    /// Learn per-feature mean and standard deviation.
    pub fn fit(features: ArrayView2<f32>) -> Self {
        let n_samples = features.ncols().max(1);

        let mut means = Vec::with_capacity(features.nrows());
        let mut stds = Vec::with_capacity(features.nrows());

        for row in features.rows() {
            let mean = row.sum() / n_samples as f32;
            let var = row.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>()
                / n_samples as f32;
            let std = var.sqrt();

            means.push(mean);
            stds.push(if std > 0.0 { std } else { 1.0 });
        }

        Self { means, stds }
    }

    /// Learn statistics and transform in one call.
    pub fn fit_transform(features: ArrayView2<f32>) -> (Self, Array2<f32>) {
        let scaler = Self::fit(features);
        let scaled = scaler
            .transform(features)
            .expect("transform of fitting data cannot mismatch");
        (scaler, scaled)
    }

    /// Apply the learned statistics: `(x - mean) / std` per feature.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::DimensionMismatch`] if the feature count
    /// differs from the fitted data.
    pub fn transform(&self, features: ArrayView2<f32>) -> Result<Array2<f32>, PreprocessError> {
        if features.nrows() != self.means.len() {
            return Err(PreprocessError::DimensionMismatch {
                fitted: self.means.len(),
                got: features.nrows(),
            });
        }

        let mut out = features.to_owned();
        for (f, mut row) in out.rows_mut().into_iter().enumerate() {
            let mean = self.means[f];
            let inv_std = 1.0 / self.stds[f];
            row.mapv_inplace(|x| (x - mean) * inv_std);
        }
        Ok(out)
    }

    /// Restore a scaler from previously learned statistics.
    ///
    /// Used when loading persisted artifacts.
    pub fn from_stats(means: Vec<f32>, stds: Vec<f32>) -> Self {
        debug_assert_eq!(means.len(), stds.len());
        Self { means, stds }
    }

    /// Number of features the scaler was fitted on.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Learned per-feature means.
    pub fn means(&self) -> &[f32] {
        &self.means
    }

    /// Learned per-feature standard deviations (zero-variance clamped to 1).
    pub fn stds(&self) -> &[f32] {
        &self.stds
    }
}
