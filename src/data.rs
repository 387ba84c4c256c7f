//! Loading prescription records from CSV using Polars

use std::path::Path;

use indexmap::IndexMap;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MiningError, Result};

/// One input row: field name to raw text, in column order.
///
/// Only the designated item field is interpreted; every other field is
/// passthrough metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: IndexMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

/// Load a headered CSV file into raw records
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `field` - Column holding the delimiter-separated item list
///
/// # Returns
/// * One `RawRecord` per data row. Every column is read as text and null
///   cells become empty strings.
pub fn load_records(file_path: impl AsRef<Path>, field: &str) -> Result<Vec<RawRecord>> {
    let file_path = file_path.as_ref();

    // Unreadable files surface as Io; anything polars rejects past this point is bad input
    std::fs::metadata(file_path)?;

    // Schema inference over zero rows reads every column as String
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|err| {
            MiningError::input_format(format!("malformed CSV {}: {}", file_path.display(), err))
        })?;

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    debug!("Columns in {}: {:?}", file_path.display(), column_names);

    if !column_names.iter().any(|name| name == field) {
        return Err(MiningError::input_format(format!(
            "column '{}' not found in {} (available: {})",
            field,
            file_path.display(),
            column_names.join(", ")
        )));
    }

    let records = dataframe_to_records(&df, &column_names)?;
    info!(
        "Loaded {} records from {}",
        records.len(),
        file_path.display()
    );

    Ok(records)
}

/// Convert every row of a DataFrame into a `RawRecord`
fn dataframe_to_records(df: &DataFrame, column_names: &[String]) -> Result<Vec<RawRecord>> {
    let mut columns: Vec<Vec<String>> = Vec::with_capacity(column_names.len());
    for series in df.get_columns() {
        let text = series.cast(&DataType::String)?;
        let values = text
            .str()?
            .into_iter()
            // A null item cell is an empty transaction, not a literal "nan" item
            .map(|value| value.unwrap_or_default().to_string())
            .collect();
        columns.push(values);
    }

    let records = (0..df.height())
        .map(|row| {
            column_names
                .iter()
                .zip(columns.iter())
                .map(|(name, values)| (name.clone(), values[row].clone()))
                .collect()
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PatientID,PrescriptionID,PatientAge,DrugsPrescribed").unwrap();
        writeln!(file, "p1,PRES-00001,34,\"Ibuprofen,Paracetamol\"").unwrap();
        writeln!(file, "p2,PRES-00002,71,Metformin").unwrap();
        writeln!(file, "p3,PRES-00003,45,").unwrap();
        file
    }

    #[test]
    fn test_load_records() {
        let test_file = create_test_csv();
        let records = load_records(test_file.path(), "DrugsPrescribed").unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("DrugsPrescribed"), Some("Ibuprofen,Paracetamol"));
        assert_eq!(records[1].get("PatientAge"), Some("71"));
        assert_eq!(records[2].get("DrugsPrescribed"), Some(""));
        assert_eq!(
            records[0].field_names().collect::<Vec<_>>(),
            vec!["PatientID", "PrescriptionID", "PatientAge", "DrugsPrescribed"]
        );
    }

    #[test]
    fn test_missing_field_is_input_format_error() {
        let test_file = create_test_csv();
        let err = load_records(test_file.path(), "Drugs").unwrap_err();
        assert!(err.is_input_format());
    }

    #[test]
    fn test_ragged_row_is_input_format_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PatientID,DrugsPrescribed").unwrap();
        writeln!(file, "p1,A").unwrap();
        writeln!(file, "p2,A,extra,more").unwrap();

        let err = load_records(file.path(), "DrugsPrescribed").unwrap_err();
        assert!(err.is_input_format());
        assert!(err.to_string().contains("malformed CSV"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(dir.path().join("absent.csv"), "DrugsPrescribed").unwrap_err();
        assert!(matches!(err, MiningError::Io(_)));
    }

    #[test]
    fn test_header_only_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PatientID,DrugsPrescribed").unwrap();

        let records = load_records(file.path(), "DrugsPrescribed").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_raw_record_from_iter() {
        let record: RawRecord = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.values().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(record.get("c"), None);
    }
}
