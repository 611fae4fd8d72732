//! Training infrastructure for both ensembles.
//!
//! ## Shared Infrastructure
//!
//! - [`Gradients`]: column-major gradient pair storage
//! - [`SoftmaxLoss`]: multi-class cross-entropy objective
//! - [`sampling`]: seeded row/bootstrap/column samplers
//! - [`TrainingLogger`], [`Verbosity`]: console progress
//!
//! ## Model-Specific Training
//!
//! - [`gbdt`]: gradient-boosted trees (exact greedy split search)
//! - [`forest`]: bagged Gini decision trees

pub mod forest;
pub mod gbdt;
mod gradients;
mod logger;
mod objectives;
pub mod sampling;

pub use forest::{ForestParams, ForestTrainer, MaxFeatures};
pub use gbdt::{GbdtParams, GbdtTrainer};
pub use gradients::{GradsTuple, Gradients};
pub use logger::{TrainingLogger, Verbosity};
pub use objectives::SoftmaxLoss;
