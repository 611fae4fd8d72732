//! Data handling: dataset container, schema, and CSV ingestion.
//!
//! [`Dataset`] stores features in feature-major layout (`[n_features,
//! n_samples]`) together with the raw label column. [`read_csv`] loads a
//! headered CSV file, validating the presence of the label column before
//! anything else happens.

mod csv;
mod dataset;
mod error;
mod schema;

pub use csv::read_csv;
pub use dataset::{Dataset, DatasetBuilder};
pub use error::DatasetError;
pub use schema::DatasetSchema;
