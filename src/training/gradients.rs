//! Gradient pair storage for boosting.

/// First- and second-order gradient of the loss for one sample/output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

/// Gradient storage for all outputs, column-major: the pairs for output `k`
/// occupy `[k * n_rows, (k + 1) * n_rows)`.
#[derive(Debug, Clone)]
pub struct Gradients {
    pairs: Vec<GradsTuple>,
    n_rows: usize,
    n_outputs: usize,
}

impl Gradients {
    /// Allocate zeroed gradient storage.
    pub fn new(n_rows: usize, n_outputs: usize) -> Self {
        Self {
            pairs: vec![GradsTuple::default(); n_rows * n_outputs],
            n_rows,
            n_outputs,
        }
    }

    /// Number of samples.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of outputs.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// All pairs, column-major.
    #[inline]
    pub fn pairs(&self) -> &[GradsTuple] {
        &self.pairs
    }

    /// All pairs, mutable.
    #[inline]
    pub fn pairs_mut(&mut self) -> &mut [GradsTuple] {
        &mut self.pairs
    }

    /// Pairs for a single output.
    #[inline]
    pub fn output_pairs(&self, output: usize) -> &[GradsTuple] {
        debug_assert!(output < self.n_outputs);
        &self.pairs[output * self.n_rows..(output + 1) * self.n_rows]
    }

    /// Pairs for a single output, mutable.
    #[inline]
    pub fn output_pairs_mut(&mut self, output: usize) -> &mut [GradsTuple] {
        debug_assert!(output < self.n_outputs);
        &mut self.pairs[output * self.n_rows..(output + 1) * self.n_rows]
    }
}
