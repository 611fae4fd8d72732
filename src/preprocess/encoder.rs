//! Label encoding.

use serde::{Deserialize, Serialize};

use super::PreprocessError;

/// Bijective mapping between raw label values and integer class codes.
///
/// Codes are assigned over the **sorted** set of distinct label values seen
/// during fitting, so the mapping is independent of row order: for labels
/// `{"dog", "cat"}` the codes are `cat = 0`, `dog = 1` regardless of which
/// appears first in the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Distinct label values in sorted order; index = class code.
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the label vocabulary from raw values.
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    /// Restore an encoder from a persisted class list.
    ///
    /// The list must already be sorted and deduplicated; debug-asserted.
    pub fn from_classes(classes: Vec<String>) -> Self {
        debug_assert!(
            classes.windows(2).all(|w| w[0] < w[1]),
            "classes must be sorted and unique"
        );
        Self { classes }
    }

    /// Map raw labels to class codes.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::UnknownLabel`] for any value not seen
    /// during fitting.
    pub fn encode(&self, labels: &[String]) -> Result<Vec<u32>, PreprocessError> {
        labels
            .iter()
            .map(|l| {
                self.classes
                    .binary_search(l)
                    .map(|idx| idx as u32)
                    .map_err(|_| PreprocessError::UnknownLabel(l.clone()))
            })
            .collect()
    }

    /// Map a class code back to its raw label.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::InvalidCode`] for codes outside the fitted
    /// vocabulary.
    pub fn decode(&self, code: u32) -> Result<&str, PreprocessError> {
        self.classes
            .get(code as usize)
            .map(|s| s.as_str())
            .ok_or(PreprocessError::InvalidCode {
                code,
                n_classes: self.classes.len(),
            })
    }

    /// Number of distinct classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// The class vocabulary in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
