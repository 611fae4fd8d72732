//! Gradient-boosted tree training.

mod grower;
mod trainer;

pub use grower::{GrowerParams, TreeGrower};
pub use trainer::{GbdtParams, GbdtTrainer};
