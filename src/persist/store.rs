//! Versioned artifact store.
//!
//! Maps the four pipeline artifacts to fixed, version-suffixed file names in
//! an output directory:
//!
//! - `rf_model-v{VERSION}.grv`
//! - `xgb_model-v{VERSION}.grv`
//! - `scaler-v{VERSION}.grv`
//! - `label_encoder-v{VERSION}.grv`
//!
//! Re-saving under the same version tag overwrites in place; callers that
//! care can check [`ArtifactStore::existing_paths`] first.

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{ForestModel, GbdtModel};
use crate::preprocess::{LabelEncoder, StandardScaler};

use super::codec::{self, ArtifactKind, DeserializeError, SerializeError};
use super::convert;

/// File extension for native artifacts.
pub const ARTIFACT_EXT: &str = "grv";

/// A directory of version-tagged artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    version: String,
}

impl ArtifactStore {
    /// Create a store rooted at `dir` for the given version tag.
    ///
    /// The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>, version: &str) -> Self {
        Self {
            dir: dir.into(),
            version: version.to_string(),
        }
    }

    /// The store's root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The store's version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    // =========================================================================
    // Paths
    // =========================================================================

    fn path_for(&self, prefix: &str) -> PathBuf {
        self.dir
            .join(format!("{prefix}-v{}.{ARTIFACT_EXT}", self.version))
    }

    /// Path of the random-forest model artifact.
    pub fn forest_path(&self) -> PathBuf {
        self.path_for("rf_model")
    }

    /// Path of the boosted-tree model artifact.
    pub fn gbdt_path(&self) -> PathBuf {
        self.path_for("xgb_model")
    }

    /// Path of the scaler artifact.
    pub fn scaler_path(&self) -> PathBuf {
        self.path_for("scaler")
    }

    /// Path of the label-encoder artifact.
    pub fn encoder_path(&self) -> PathBuf {
        self.path_for("label_encoder")
    }

    /// All four artifact paths in save order.
    pub fn all_paths(&self) -> [PathBuf; 4] {
        [
            self.forest_path(),
            self.gbdt_path(),
            self.scaler_path(),
            self.encoder_path(),
        ]
    }

    /// Artifact paths that already exist on disk (would be overwritten).
    pub fn existing_paths(&self) -> Vec<PathBuf> {
        self.all_paths()
            .into_iter()
            .filter(|p| p.exists())
            .collect()
    }

    // =========================================================================
    // Save
    // =========================================================================

    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Save the random-forest model; returns the written path.
    pub fn save_forest(&self, model: &ForestModel) -> Result<PathBuf, SerializeError> {
        self.ensure_dir()?;
        let path = self.forest_path();
        codec::write_file(&path, ArtifactKind::Forest, &convert::forest_to_payload(model))?;
        Ok(path)
    }

    /// Save the boosted-tree model; returns the written path.
    pub fn save_gbdt(&self, model: &GbdtModel) -> Result<PathBuf, SerializeError> {
        self.ensure_dir()?;
        let path = self.gbdt_path();
        codec::write_file(&path, ArtifactKind::Gbdt, &convert::gbdt_to_payload(model))?;
        Ok(path)
    }

    /// Save the scaler; returns the written path.
    pub fn save_scaler(&self, scaler: &StandardScaler) -> Result<PathBuf, SerializeError> {
        self.ensure_dir()?;
        let path = self.scaler_path();
        codec::write_file(&path, ArtifactKind::Scaler, &convert::scaler_to_payload(scaler))?;
        Ok(path)
    }

    /// Save the label encoder; returns the written path.
    pub fn save_encoder(&self, encoder: &LabelEncoder) -> Result<PathBuf, SerializeError> {
        self.ensure_dir()?;
        let path = self.encoder_path();
        codec::write_file(
            &path,
            ArtifactKind::LabelEncoder,
            &convert::encoder_to_payload(encoder),
        )?;
        Ok(path)
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Load the random-forest model.
    pub fn load_forest(&self) -> Result<ForestModel, DeserializeError> {
        convert::forest_from_payload(codec::read_file(&self.forest_path(), ArtifactKind::Forest)?)
    }

    /// Load the boosted-tree model.
    pub fn load_gbdt(&self) -> Result<GbdtModel, DeserializeError> {
        convert::gbdt_from_payload(codec::read_file(&self.gbdt_path(), ArtifactKind::Gbdt)?)
    }

    /// Load the scaler.
    pub fn load_scaler(&self) -> Result<StandardScaler, DeserializeError> {
        convert::scaler_from_payload(codec::read_file(&self.scaler_path(), ArtifactKind::Scaler)?)
    }

    /// Load the label encoder.
    pub fn load_encoder(&self) -> Result<LabelEncoder, DeserializeError> {
        convert::encoder_from_payload(codec::read_file(
            &self.encoder_path(),
            ArtifactKind::LabelEncoder,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn paths_follow_naming_convention() {
        let store = ArtifactStore::new("/tmp/models", "3");

        assert_eq!(
            store.forest_path(),
            PathBuf::from("/tmp/models/rf_model-v3.grv")
        );
        assert_eq!(
            store.gbdt_path(),
            PathBuf::from("/tmp/models/xgb_model-v3.grv")
        );
        assert_eq!(
            store.scaler_path(),
            PathBuf::from("/tmp/models/scaler-v3.grv")
        );
        assert_eq!(
            store.encoder_path(),
            PathBuf::from("/tmp/models/label_encoder-v3.grv")
        );
    }

    #[test]
    fn save_creates_directory_and_load_roundtrips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().join("models"), "1");

        let data = array![[1.0f32, 3.0, 5.0], [2.0, 4.0, 6.0]];
        let scaler = StandardScaler::fit(data.view());

        let path = store.save_scaler(&scaler).unwrap();
        assert!(path.exists());

        let restored = store.load_scaler().unwrap();
        assert_eq!(scaler, restored);
    }

    #[test]
    fn existing_paths_reports_collisions() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path(), "1");
        assert!(store.existing_paths().is_empty());

        let data = array![[1.0f32, 2.0]];
        store.save_scaler(&StandardScaler::fit(data.view())).unwrap();

        let existing = store.existing_paths();
        assert_eq!(existing, vec![store.scaler_path()]);
    }

    #[test]
    fn load_missing_artifact_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path(), "1");

        assert!(matches!(
            store.load_scaler(),
            Err(DeserializeError::Io(_))
        ));
    }
}
