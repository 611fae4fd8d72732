//! Payload structures for the native artifact format.
//!
//! These structs are designed for serialization with Postcard. They mirror
//! the runtime types but are optimized for compact binary storage.

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Payload
// ============================================================================

/// Version-tagged payload enum for forward compatibility.
///
/// New format versions add new variants rather than modifying existing ones,
/// so older readers can detect unsupported versions by the discriminant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    /// Version 1 payload format.
    V1(PayloadV1),
}

impl Payload {
    /// Metadata of the payload, independent of format version.
    pub fn meta(&self) -> &MetaPayload {
        match self {
            Payload::V1(v1) => &v1.meta,
        }
    }
}

/// Version 1 payload structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadV1 {
    /// Artifact metadata.
    pub meta: MetaPayload,
    /// Artifact-specific payload.
    pub artifact: ArtifactPayload,
}

// ============================================================================
// Metadata
// ============================================================================

/// Metadata common to all artifact types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaPayload {
    /// Number of input features (0 where not applicable).
    pub n_features: u32,
    /// Number of classes (0 where not applicable).
    pub n_classes: u32,
    /// Feature names (optional).
    pub feature_names: Option<Vec<String>>,
}

// ============================================================================
// Artifact Payloads
// ============================================================================

/// Artifact-specific payload variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArtifactPayload {
    /// Random-forest model (distribution leaves).
    Forest(ForestPayload),
    /// Gradient-boosted tree model (scalar leaves).
    Gbdt(GbdtPayload),
    /// Standardization statistics.
    Scaler(ScalerPayload),
    /// Label vocabulary.
    LabelEncoder(EncoderPayload),
}

/// Random-forest payload.
///
/// Leaf values are flattened per tree: `n_nodes * n_classes` probabilities,
/// node-major (internal nodes carry zeros).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestPayload {
    /// Number of classes per leaf distribution.
    pub n_classes: u32,
    /// Individual tree payloads.
    pub trees: Vec<TreePayload>,
}

/// Gradient-boosted tree payload.
///
/// Leaf values are one scalar weight per node (internal nodes carry zeros).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtPayload {
    /// Base score for each output group.
    pub base_scores: Vec<f32>,
    /// Group assignment for each tree.
    pub tree_groups: Vec<u32>,
    /// Individual tree payloads.
    pub trees: Vec<TreePayload>,
}

/// Single decision tree payload (structure-of-arrays).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreePayload {
    /// Number of nodes.
    pub num_nodes: u32,
    /// Split feature indices (one per node).
    pub split_features: Vec<u32>,
    /// Split thresholds (one per node, 0.0 for leaves).
    pub thresholds: Vec<f32>,
    /// Left child indices (one per node, 0 for leaves).
    pub left_children: Vec<u32>,
    /// Right child indices (one per node, 0 for leaves).
    pub right_children: Vec<u32>,
    /// Default direction for missing values (one per node).
    pub default_left: Vec<bool>,
    /// Whether each node is a leaf.
    pub is_leaf: Vec<bool>,
    /// Leaf payload values, flattened (layout depends on the leaf type).
    pub leaf_values: Vec<f32>,
}

/// Standardization statistics payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerPayload {
    /// Per-feature means.
    pub means: Vec<f32>,
    /// Per-feature standard deviations.
    pub stds: Vec<f32>,
}

/// Label vocabulary payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderPayload {
    /// Distinct labels in code order (sorted).
    pub classes: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
