//! Conversion between runtime types and storage payloads.

use crate::model::{ForestModel, GbdtModel, ModelMeta};
use crate::preprocess::{LabelEncoder, StandardScaler};
use crate::repr::{DistributionLeaf, Forest, ScalarLeaf, Tree};

use super::codec::DeserializeError;
use super::payload::{
    ArtifactPayload, EncoderPayload, ForestPayload, GbdtPayload, MetaPayload, Payload, PayloadV1,
    ScalerPayload, TreePayload,
};

// ============================================================================
// Scaler
// ============================================================================

/// Convert a fitted scaler to a payload.
pub fn scaler_to_payload(scaler: &StandardScaler) -> Payload {
    Payload::V1(PayloadV1 {
        meta: MetaPayload {
            n_features: scaler.n_features() as u32,
            n_classes: 0,
            feature_names: None,
        },
        artifact: ArtifactPayload::Scaler(ScalerPayload {
            means: scaler.means().to_vec(),
            stds: scaler.stds().to_vec(),
        }),
    })
}

/// Restore a scaler from a payload.
pub fn scaler_from_payload(payload: Payload) -> Result<StandardScaler, DeserializeError> {
    match payload {
        Payload::V1(PayloadV1 {
            artifact: ArtifactPayload::Scaler(s),
            ..
        }) => {
            if s.means.len() != s.stds.len() {
                return Err(DeserializeError::CorruptPayload(
                    "scaler means/stds length mismatch".into(),
                ));
            }
            Ok(StandardScaler::from_stats(s.means, s.stds))
        }
        _ => Err(DeserializeError::CorruptPayload(
            "expected scaler payload".into(),
        )),
    }
}

// ============================================================================
// Label Encoder
// ============================================================================

/// Convert a fitted label encoder to a payload.
pub fn encoder_to_payload(encoder: &LabelEncoder) -> Payload {
    Payload::V1(PayloadV1 {
        meta: MetaPayload {
            n_features: 0,
            n_classes: encoder.n_classes() as u32,
            feature_names: None,
        },
        artifact: ArtifactPayload::LabelEncoder(EncoderPayload {
            classes: encoder.classes().to_vec(),
        }),
    })
}

/// Restore a label encoder from a payload.
pub fn encoder_from_payload(payload: Payload) -> Result<LabelEncoder, DeserializeError> {
    match payload {
        Payload::V1(PayloadV1 {
            artifact: ArtifactPayload::LabelEncoder(e),
            ..
        }) => {
            if !e.classes.windows(2).all(|w| w[0] < w[1]) {
                return Err(DeserializeError::CorruptPayload(
                    "encoder classes must be sorted and unique".into(),
                ));
            }
            Ok(LabelEncoder::from_classes(e.classes))
        }
        _ => Err(DeserializeError::CorruptPayload(
            "expected label encoder payload".into(),
        )),
    }
}

// ============================================================================
// Trees
// ============================================================================

fn scalar_tree_to_payload(tree: &Tree<ScalarLeaf>) -> TreePayload {
    let (split, thresh, left, right, default_left, is_leaf, leaves) = tree.as_arrays();
    TreePayload {
        num_nodes: tree.n_nodes() as u32,
        split_features: split.to_vec(),
        thresholds: thresh.to_vec(),
        left_children: left.to_vec(),
        right_children: right.to_vec(),
        default_left: default_left.to_vec(),
        is_leaf: is_leaf.to_vec(),
        leaf_values: leaves.iter().map(|l| l.0).collect(),
    }
}

fn scalar_tree_from_payload(tree: TreePayload) -> Result<Tree<ScalarLeaf>, DeserializeError> {
    let n = tree.num_nodes as usize;
    if tree.leaf_values.len() != n {
        return Err(DeserializeError::CorruptPayload(format!(
            "tree has {} nodes but {} leaf values",
            n,
            tree.leaf_values.len()
        )));
    }
    build_tree(tree, tree_payload_leaves_scalar)
}

fn dist_tree_to_payload(tree: &Tree<DistributionLeaf>) -> TreePayload {
    let (split, thresh, left, right, default_left, is_leaf, leaves) = tree.as_arrays();
    TreePayload {
        num_nodes: tree.n_nodes() as u32,
        split_features: split.to_vec(),
        thresholds: thresh.to_vec(),
        left_children: left.to_vec(),
        right_children: right.to_vec(),
        default_left: default_left.to_vec(),
        is_leaf: is_leaf.to_vec(),
        leaf_values: leaves.iter().flat_map(|l| l.0.iter().copied()).collect(),
    }
}

fn dist_tree_from_payload(
    tree: TreePayload,
    n_classes: usize,
) -> Result<Tree<DistributionLeaf>, DeserializeError> {
    let n = tree.num_nodes as usize;
    if tree.leaf_values.len() != n * n_classes {
        return Err(DeserializeError::CorruptPayload(format!(
            "tree has {} nodes x {} classes but {} leaf values",
            n,
            n_classes,
            tree.leaf_values.len()
        )));
    }
    build_tree(tree, move |values| {
        values
            .chunks(n_classes)
            .map(|chunk| DistributionLeaf(chunk.to_vec().into_boxed_slice()))
            .collect()
    })
}

fn tree_payload_leaves_scalar(values: &[f32]) -> Vec<ScalarLeaf> {
    values.iter().map(|&v| ScalarLeaf(v)).collect()
}

fn build_tree<L, F>(tree: TreePayload, leaves: F) -> Result<Tree<L>, DeserializeError>
where
    L: crate::repr::Leaf,
    F: FnOnce(&[f32]) -> Vec<L>,
{
    let n = tree.num_nodes as usize;
    for (name, len) in [
        ("split_features", tree.split_features.len()),
        ("thresholds", tree.thresholds.len()),
        ("left_children", tree.left_children.len()),
        ("right_children", tree.right_children.len()),
        ("default_left", tree.default_left.len()),
        ("is_leaf", tree.is_leaf.len()),
    ] {
        if len != n {
            return Err(DeserializeError::CorruptPayload(format!(
                "tree array '{}' has {} entries for {} nodes",
                name, len, n
            )));
        }
    }

    let leaf_values = leaves(&tree.leaf_values);
    let built = Tree::new(
        tree.split_features,
        tree.thresholds,
        tree.left_children,
        tree.right_children,
        tree.default_left,
        tree.is_leaf,
        leaf_values,
    );

    built
        .validate()
        .map_err(|e| DeserializeError::CorruptPayload(format!("invalid tree structure: {e:?}")))?;
    Ok(built)
}

// ============================================================================
// Models
// ============================================================================

/// Convert a trained boosted model to a payload.
pub fn gbdt_to_payload(model: &GbdtModel) -> Payload {
    let forest = model.forest();
    Payload::V1(PayloadV1 {
        meta: MetaPayload {
            n_features: model.meta().n_features as u32,
            n_classes: model.meta().n_classes as u32,
            feature_names: model.meta().feature_names.clone(),
        },
        artifact: ArtifactPayload::Gbdt(GbdtPayload {
            base_scores: forest.base_score().to_vec(),
            tree_groups: forest.tree_groups().to_vec(),
            trees: forest.trees().map(scalar_tree_to_payload).collect(),
        }),
    })
}

/// Restore a boosted model from a payload.
pub fn gbdt_from_payload(payload: Payload) -> Result<GbdtModel, DeserializeError> {
    match payload {
        Payload::V1(PayloadV1 {
            meta,
            artifact: ArtifactPayload::Gbdt(g),
        }) => {
            if g.tree_groups.len() != g.trees.len() {
                return Err(DeserializeError::CorruptPayload(
                    "tree_groups length does not match tree count".into(),
                ));
            }

            let n_groups = g.base_scores.len() as u32;
            let mut forest = Forest::new(n_groups).with_base_score(g.base_scores.clone());
            for (tree, &group) in g.trees.into_iter().zip(g.tree_groups.iter()) {
                if group >= n_groups {
                    return Err(DeserializeError::CorruptPayload(format!(
                        "tree group {group} out of range for {n_groups} groups"
                    )));
                }
                forest.push_tree(scalar_tree_from_payload(tree)?, group);
            }

            let mut model_meta =
                ModelMeta::new(meta.n_features as usize, meta.n_classes as usize);
            model_meta.feature_names = meta.feature_names;
            Ok(GbdtModel::from_forest(forest, model_meta))
        }
        _ => Err(DeserializeError::CorruptPayload(
            "expected boosted model payload".into(),
        )),
    }
}

/// Convert a trained random forest to a payload.
pub fn forest_to_payload(model: &ForestModel) -> Payload {
    let forest = model.forest();
    Payload::V1(PayloadV1 {
        meta: MetaPayload {
            n_features: model.meta().n_features as u32,
            n_classes: model.meta().n_classes as u32,
            feature_names: model.meta().feature_names.clone(),
        },
        artifact: ArtifactPayload::Forest(ForestPayload {
            n_classes: forest.n_groups(),
            trees: forest.trees().map(dist_tree_to_payload).collect(),
        }),
    })
}

/// Restore a random forest from a payload.
pub fn forest_from_payload(payload: Payload) -> Result<ForestModel, DeserializeError> {
    match payload {
        Payload::V1(PayloadV1 {
            meta,
            artifact: ArtifactPayload::Forest(f),
        }) => {
            let n_classes = f.n_classes as usize;
            let mut forest = Forest::new(f.n_classes);
            for tree in f.trees {
                forest.push_tree(dist_tree_from_payload(tree, n_classes)?, 0);
            }

            let mut model_meta = ModelMeta::new(meta.n_features as usize, n_classes);
            model_meta.feature_names = meta.feature_names;
            Ok(ForestModel::from_forest(forest, model_meta))
        }
        _ => Err(DeserializeError::CorruptPayload(
            "expected forest model payload".into(),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForestConfig, GbdtConfig};
    use ndarray::array;

    fn toy_data() -> (ndarray::Array2<f32>, Vec<u32>) {
        let features = array![
            [0.1f32, 0.2, 0.3, 5.1, 5.2, 5.3],
            [1.0, 1.1, 0.9, 1.0, 0.9, 1.1],
        ];
        let labels = vec![0u32, 0, 0, 1, 1, 1];
        (features, labels)
    }

    #[test]
    fn scaler_payload_roundtrip() {
        let data = array![[1.0f32, 3.0, 5.0], [2.0, 4.0, 6.0]];
        let scaler = StandardScaler::fit(data.view());

        let restored = scaler_from_payload(scaler_to_payload(&scaler)).unwrap();
        assert_eq!(scaler, restored);
    }

    #[test]
    fn encoder_payload_roundtrip() {
        let labels: Vec<String> = ["dog", "cat", "fish"].iter().map(|s| s.to_string()).collect();
        let encoder = LabelEncoder::fit(&labels);

        let restored = encoder_from_payload(encoder_to_payload(&encoder)).unwrap();
        assert_eq!(encoder, restored);
    }

    #[test]
    fn encoder_payload_rejects_unsorted_classes() {
        let payload = Payload::V1(PayloadV1 {
            meta: MetaPayload::default(),
            artifact: ArtifactPayload::LabelEncoder(EncoderPayload {
                classes: vec!["dog".into(), "cat".into()],
            }),
        });
        assert!(matches!(
            encoder_from_payload(payload),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }

    #[test]
    fn gbdt_payload_roundtrip_preserves_predictions() {
        let (features, labels) = toy_data();
        let config = GbdtConfig::builder().n_rounds(10).build().unwrap();
        let model = GbdtModel::train(features.view(), &labels, config).unwrap();

        let restored = gbdt_from_payload(gbdt_to_payload(&model)).unwrap();

        assert_eq!(
            model.predict_proba(features.view()),
            restored.predict_proba(features.view())
        );
        assert_eq!(model.meta(), restored.meta());
    }

    #[test]
    fn forest_payload_roundtrip_preserves_predictions() {
        let (features, labels) = toy_data();
        let config = ForestConfig::builder().n_trees(10).build().unwrap();
        let model = ForestModel::train(features.view(), &labels, config, 1).unwrap();

        let restored = forest_from_payload(forest_to_payload(&model)).unwrap();

        assert_eq!(
            model.predict_proba(features.view()),
            restored.predict_proba(features.view())
        );
    }

    #[test]
    fn wrong_variant_is_rejected() {
        let data = array![[1.0f32, 2.0]];
        let scaler = StandardScaler::fit(data.view());
        let payload = scaler_to_payload(&scaler);

        assert!(matches!(
            gbdt_from_payload(payload),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }
}
