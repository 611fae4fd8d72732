//! Deterministic synthetic data for tests and benchmarks.

use ndarray::Array2;

/// Generate a clustered classification dataset.
///
/// Class `k` is centered at `6 * k` in every feature, with deterministic
/// integer-hash noise so no RNG is involved. Returns a feature-major matrix
/// `[n_features, n_samples]` and one class code per sample, classes
/// round-robin over samples.
pub fn clustered(n_samples: usize, n_features: usize, n_classes: usize) -> (Array2<f32>, Vec<u32>) {
    debug_assert!(n_classes >= 2);

    let mut features = Array2::zeros((n_features, n_samples));
    let mut labels = Vec::with_capacity(n_samples);

    for s in 0..n_samples {
        let class = s % n_classes;
        labels.push(class as u32);

        for f in 0..n_features {
            let noise = ((s * 17 + f * 31) % 100) as f32 / 50.0 - 1.0;
            features[[f, s]] = (6 * class) as f32 + noise;
        }
    }

    (features, labels)
}
