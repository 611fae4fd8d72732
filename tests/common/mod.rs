//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use groves::model::{ForestConfig, GbdtConfig};

/// Write a CSV file under `dir` and return its path.
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Small forest config so tests stay fast.
pub fn quick_forest() -> ForestConfig {
    ForestConfig::builder().n_trees(15).build().unwrap()
}

/// Small boosted config so tests stay fast.
pub fn quick_gbdt() -> GbdtConfig {
    GbdtConfig::builder().n_rounds(10).build().unwrap()
}

/// CSV text with two well-separated classes (`lo` / `hi` labels).
pub fn clustered_csv(n_samples: usize) -> String {
    let mut out = String::from("x,y,label\n");
    for s in 0..n_samples {
        let (center, label) = if s % 2 == 0 { (0.0, "lo") } else { (6.0, "hi") };
        let noise = (s * 17 % 100) as f32 / 50.0 - 1.0;
        writeln!(out, "{},{},{}", center + noise, center - noise, label).unwrap();
    }
    out
}
