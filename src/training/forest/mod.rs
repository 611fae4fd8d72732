//! Random-forest training.

mod builder;
mod trainer;

pub use builder::{GiniParams, GiniTreeBuilder};
pub use trainer::{ForestParams, ForestTrainer, MaxFeatures};
