//! CSV ingestion.
//!
//! Reads a headered CSV file into a [`Dataset`]: every column except the
//! designated label column must parse as `f32`; the label column is kept as
//! raw strings for [`LabelEncoder`](crate::preprocess::LabelEncoder) to fit.

use std::path::Path;

use super::error::DatasetError;
use super::{Dataset, DatasetBuilder};

/// Load a labeled dataset from a CSV file.
///
/// The file must have a header row. The column named `label_column` supplies
/// the raw labels; all remaining columns become features in header order.
///
/// # Errors
///
/// - [`DatasetError::Io`] / [`DatasetError::Csv`] if the file is missing or
///   malformed
/// - [`DatasetError::MissingColumn`] if `label_column` is absent — checked
///   before any rows are parsed
/// - [`DatasetError::InvalidValue`] if a feature cell is not a number
/// - [`DatasetError::EmptyFeatures`] / [`DatasetError::EmptyDataset`] for
///   degenerate files
pub fn read_csv(path: &Path, label_column: &str) -> Result<Dataset, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| DatasetError::MissingColumn(label_column.to_string()))?;

    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx)
        .map(|(_, h)| h.clone())
        .collect();

    if feature_names.is_empty() {
        return Err(DatasetError::EmptyFeatures);
    }

    let mut columns: Vec<Vec<f32>> = vec![Vec::new(); feature_names.len()];
    let mut labels: Vec<String> = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;

        let mut col = 0usize;
        for (cell_idx, value) in record.iter().enumerate() {
            if cell_idx == label_idx {
                labels.push(value.to_string());
                continue;
            }
            let parsed: f32 =
                value
                    .trim()
                    .parse()
                    .map_err(|_| DatasetError::InvalidValue {
                        row: row_no,
                        column: headers[cell_idx].clone(),
                        value: value.to_string(),
                    })?;
            columns[col].push(parsed);
            col += 1;
        }
    }

    if labels.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }

    let mut builder = DatasetBuilder::new();
    for (name, values) in feature_names.iter().zip(columns) {
        builder = builder.add_feature_vec(name, values);
    }

    builder.labels(labels).label_name(label_column).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn read_basic_csv() {
        let file = write_csv("a,b,label\n1,2,cat\n3,4,dog\n5,6,cat\n");
        let ds = read_csv(file.path(), "label").unwrap();

        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.feature(0).to_vec(), vec![1.0, 3.0, 5.0]);
        assert_eq!(ds.feature(1).to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!(ds.labels().unwrap(), &["cat", "dog", "cat"]);
        assert_eq!(ds.schema().feature_names(), &["a", "b"]);
        assert_eq!(ds.schema().label_name(), Some("label"));
    }

    #[test]
    fn label_column_position_does_not_matter() {
        let file = write_csv("label,x,y\ncat,1,2\ndog,3,4\n");
        let ds = read_csv(file.path(), "label").unwrap();

        assert_eq!(ds.schema().feature_names(), &["x", "y"]);
        assert_eq!(ds.feature(0).to_vec(), vec![1.0, 3.0]);
        assert_eq!(ds.labels().unwrap(), &["cat", "dog"]);
    }

    #[test]
    fn missing_label_column() {
        let file = write_csv("a,b\n1,2\n");
        let err = read_csv(file.path(), "label").unwrap_err();

        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "label"));
        assert!(err.to_string().contains("column named 'label'"));
    }

    #[test]
    fn missing_file_is_io_like() {
        let err = read_csv(Path::new("/nonexistent/data.csv"), "label").unwrap_err();
        assert!(matches!(err, DatasetError::Csv(_) | DatasetError::Io(_)));
    }

    #[test]
    fn non_numeric_feature_cell() {
        let file = write_csv("a,label\noops,cat\n");
        let err = read_csv(file.path(), "label").unwrap_err();

        match err {
            DatasetError::InvalidValue { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "a");
                assert_eq!(value, "oops");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn only_label_column() {
        let file = write_csv("label\ncat\n");
        let err = read_csv(file.path(), "label").unwrap_err();
        assert!(matches!(err, DatasetError::EmptyFeatures));
    }

    #[test]
    fn header_but_no_rows() {
        let file = write_csv("a,label\n");
        let err = read_csv(file.path(), "label").unwrap_err();
        assert!(matches!(err, DatasetError::EmptyDataset));
    }
}
