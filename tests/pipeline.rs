//! End-to-end pipeline tests: CSV in, four artifacts out.

mod common;

use groves::pipeline::{Pipeline, PipelineConfig, PipelineError};
use groves::data::DatasetError;
use groves::Verbosity;

fn quiet_config(data_path: &std::path::Path, model_dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig::builder()
        .data_path(data_path)
        .model_dir(model_dir)
        .forest(common::quick_forest())
        .gbdt(common::quick_gbdt())
        .verbosity(Verbosity::Silent)
        .n_threads(1)
        .build()
}

#[test]
fn valid_csv_produces_exactly_four_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", &common::clustered_csv(40));
    let model_dir = tmp.path().join("models");

    let report = Pipeline::new(quiet_config(&csv, &model_dir)).run().unwrap();

    assert_eq!(report.n_samples, 40);
    assert_eq!(report.n_features, 2);
    assert_eq!(report.n_classes, 2);

    for path in report.artifact_paths() {
        assert!(path.exists(), "missing artifact {}", path.display());
    }

    // Exactly four files, under the fixed naming convention
    let mut names: Vec<String> = std::fs::read_dir(&model_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "label_encoder-v1.grv",
            "rf_model-v1.grv",
            "scaler-v1.grv",
            "xgb_model-v1.grv",
        ]
    );

    // Both models separate the clusters on the training set
    assert!(report.forest_train_accuracy > 0.95);
    assert!(report.gbdt_train_accuracy > 0.95);
}

#[test]
fn missing_label_column_fails_before_any_output() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", "a,b\n1,2\n3,4\n");
    let model_dir = tmp.path().join("models");

    let err = Pipeline::new(quiet_config(&csv, &model_dir)).run().unwrap_err();

    match err {
        PipelineError::Dataset(DatasetError::MissingColumn(column)) => {
            assert_eq!(column, "label");
        }
        other => panic!("expected missing-column error, got {other}"),
    }

    // Nothing was written, not even the directory
    assert!(!model_dir.exists());
}

#[test]
fn missing_input_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let model_dir = tmp.path().join("models");
    let err = Pipeline::new(quiet_config(&tmp.path().join("absent.csv"), &model_dir))
        .run()
        .unwrap_err();

    assert!(matches!(err, PipelineError::Dataset(_)));
    assert!(!model_dir.exists());
}

#[test]
fn malformed_cell_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", "a,label\noops,x\n1,y\n");
    let model_dir = tmp.path().join("models");

    let err = Pipeline::new(quiet_config(&csv, &model_dir)).run().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Dataset(DatasetError::InvalidValue { .. })
    ));
    assert!(!model_dir.exists());
}

#[test]
fn tiny_example_dataset() {
    // Three rows, two features, labels cat/dog/cat
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", "a,b,label\n1,2,cat\n3,4,dog\n5,6,cat\n");
    let model_dir = tmp.path().join("models");

    let report = Pipeline::new(quiet_config(&csv, &model_dir)).run().unwrap();
    assert_eq!(report.n_samples, 3);
    assert_eq!(report.n_features, 2);
    assert_eq!(report.n_classes, 2);

    // Sorted label vocabulary: cat = 0, dog = 1
    let store = groves::ArtifactStore::new(&model_dir, "1");
    let encoder = store.load_encoder().unwrap();
    assert_eq!(encoder.classes(), &["cat", "dog"]);

    let raw: Vec<String> = ["cat", "dog", "cat"].iter().map(|s| s.to_string()).collect();
    assert_eq!(encoder.encode(&raw).unwrap(), vec![0, 1, 0]);
}

#[test]
fn rerun_with_same_version_overwrites_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", &common::clustered_csv(30));
    let model_dir = tmp.path().join("models");

    let first = Pipeline::new(quiet_config(&csv, &model_dir)).run().unwrap();
    let second = Pipeline::new(quiet_config(&csv, &model_dir)).run().unwrap();

    assert_eq!(first.forest_path, second.forest_path);

    // Still exactly four files
    let count = std::fs::read_dir(&model_dir).unwrap().count();
    assert_eq!(count, 4);
}

#[test]
fn fixed_seed_reproduces_identical_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", &common::clustered_csv(30));

    let dir_a = tmp.path().join("a");
    let dir_b = tmp.path().join("b");
    let a = Pipeline::new(quiet_config(&csv, &dir_a)).run().unwrap();
    let b = Pipeline::new(quiet_config(&csv, &dir_b)).run().unwrap();

    for (pa, pb) in a.artifact_paths().iter().zip(b.artifact_paths().iter()) {
        let bytes_a = std::fs::read(pa).unwrap();
        let bytes_b = std::fs::read(pb).unwrap();
        assert_eq!(bytes_a, bytes_b, "{} differs between runs", pa.display());
    }
}

#[test]
fn version_tag_appears_in_file_names() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(tmp.path(), "data.csv", &common::clustered_csv(20));
    let model_dir = tmp.path().join("models");

    let config = PipelineConfig::builder()
        .data_path(&csv)
        .model_dir(&model_dir)
        .version("7")
        .forest(common::quick_forest())
        .gbdt(common::quick_gbdt())
        .verbosity(Verbosity::Silent)
        .n_threads(1)
        .build();

    let report = Pipeline::new(config).run().unwrap();
    assert!(report
        .forest_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains("-v7."));
}

#[test]
fn custom_label_column_name() {
    let tmp = tempfile::tempdir().unwrap();
    let csv = common::write_csv(
        tmp.path(),
        "data.csv",
        "a,target\n1,p\n2,q\n3,p\n4,q\n5,p\n6,q\n",
    );
    let model_dir = tmp.path().join("models");

    let config = PipelineConfig::builder()
        .data_path(&csv)
        .model_dir(&model_dir)
        .label_column("target")
        .forest(common::quick_forest())
        .gbdt(common::quick_gbdt())
        .verbosity(Verbosity::Silent)
        .n_threads(1)
        .build();

    let report = Pipeline::new(config).run().unwrap();
    assert_eq!(report.n_features, 1);
    assert_eq!(report.n_classes, 2);
}
