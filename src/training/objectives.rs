//! Training objectives.
//!
//! Both ensembles here are classifiers over integer class codes, so the only
//! objective is softmax cross-entropy. Two-class data trains with two output
//! groups rather than a separate binary path.

use ndarray::ArrayViewMut2;

use super::GradsTuple;

/// Floor applied to hessians so split finding never divides by zero.
const HESS_MIN: f32 = 1e-6;

/// Softmax cross-entropy loss for multi-class classification.
///
/// Labels are class codes `0..num_classes`. Predictions are K raw logits per
/// sample in column-major order (`predictions[c * n_rows + i]`).
///
/// - Gradient: `p_c - 1{c == y}`
/// - Hessian: `max(p_c * (1 - p_c), 1e-6)`
#[derive(Debug, Clone, Copy)]
pub struct SoftmaxLoss {
    /// Number of classes.
    pub num_classes: usize,
}

impl SoftmaxLoss {
    /// Create a softmax loss for the given number of classes.
    pub fn new(num_classes: usize) -> Self {
        debug_assert!(num_classes >= 2, "num_classes must be >= 2");
        Self { num_classes }
    }

    /// Number of output groups (one per class).
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.num_classes
    }

    /// Compute gradient pairs for all classes.
    ///
    /// `predictions` is column-major `[num_classes * n_rows]`; `grad_hess`
    /// has the same layout.
    pub fn compute_gradients(
        &self,
        n_rows: usize,
        predictions: &[f32],
        labels: &[u32],
        grad_hess: &mut [GradsTuple],
    ) {
        let k = self.num_classes;
        debug_assert!(predictions.len() >= k * n_rows);
        debug_assert!(grad_hess.len() >= k * n_rows);
        debug_assert!(labels.len() >= n_rows);

        for i in 0..n_rows {
            let label = labels[i] as usize;
            debug_assert!(label < k, "label {} >= num_classes {}", label, k);

            // Numerically stable softmax over this sample's logits
            let mut max_logit = f32::NEG_INFINITY;
            for c in 0..k {
                max_logit = max_logit.max(predictions[c * n_rows + i]);
            }

            let mut exp_sum = 0.0f32;
            for c in 0..k {
                exp_sum += (predictions[c * n_rows + i] - max_logit).exp();
            }

            for c in 0..k {
                let p = (predictions[c * n_rows + i] - max_logit).exp() / exp_sum;
                let target_indicator = if c == label { 1.0 } else { 0.0 };

                let idx = c * n_rows + i;
                grad_hess[idx].grad = p - target_indicator;
                grad_hess[idx].hess = (p * (1.0 - p)).max(HESS_MIN);
            }
        }
    }

    /// Compute per-class base scores (log class priors).
    pub fn compute_base_score(&self, labels: &[u32], outputs: &mut [f32]) {
        let k = self.num_classes;
        debug_assert!(outputs.len() >= k);

        if labels.is_empty() {
            outputs[..k].fill(0.0);
            return;
        }

        let mut class_counts = vec![0.0f64; k];
        for &label in labels {
            if (label as usize) < k {
                class_counts[label as usize] += 1.0;
            }
        }

        let total = labels.len() as f64;
        for c in 0..k {
            let p = (class_counts[c] / total).clamp(1e-7, 1.0 - 1e-7);
            outputs[c] = p.ln() as f32;
        }
    }

    /// Transform raw margins `[n_classes, n_samples]` to probabilities
    /// in place (softmax per sample).
    pub fn transform_predictions(&self, mut predictions: ArrayViewMut2<f32>) {
        let k = predictions.nrows();
        let n = predictions.ncols();
        if k <= 1 {
            return;
        }

        let mut scratch = vec![0.0f32; k];
        for s in 0..n {
            for c in 0..k {
                scratch[c] = predictions[[c, s]];
            }
            softmax_inplace(&mut scratch);
            for c in 0..k {
                predictions[[c, s]] = scratch[c];
            }
        }
    }
}

/// Numerically stable softmax over one sample's logits.
#[inline]
fn softmax_inplace(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }

    let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max_val).exp();
        sum += *x;
    }

    if sum > 0.0 {
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
}
