//! Batch training entry point.
//!
//! Reads the dataset, fits the scaler, encoder, and both ensemble models,
//! and writes the four artifacts. All configuration is hard-coded below;
//! there are no CLI flags.

use std::process::ExitCode;

use groves::pipeline::{Pipeline, PipelineConfig};

// -----------------------------
// CONFIG
// -----------------------------

/// Input dataset.
const DATA_PATH: &str = "data.csv";
/// Directory the artifacts are written to.
const MODEL_DIR: &str = "models";
/// Version tag baked into the artifact file names.
const VERSION: &str = "1";

fn main() -> ExitCode {
    let config = PipelineConfig::builder()
        .data_path(DATA_PATH)
        .model_dir(MODEL_DIR)
        .version(VERSION)
        .build();

    match Pipeline::new(config).run() {
        Ok(report) => {
            println!();
            println!("Training complete.");
            println!(
                "  samples: {}  features: {}  classes: {}",
                report.n_samples, report.n_features, report.n_classes
            );
            println!(
                "  train accuracy: rf {:.3}, gbt {:.3}",
                report.forest_train_accuracy, report.gbdt_train_accuracy
            );
            println!("Saved artifacts:");
            for path in report.artifact_paths() {
                println!("  - {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("[ERROR] {err}");
            ExitCode::FAILURE
        }
    }
}
