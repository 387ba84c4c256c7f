//! Transaction encoding: raw records to a boolean membership matrix
//!
//! Columns follow the vocabulary, which is sorted lexicographically by item
//! name. Item ids are column indices, so sorting ids sorts names too and an
//! itemset stored as ascending ids is already in canonical order.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::Serialize;

use crate::data::RawRecord;
use crate::error::{MiningError, Result};

/// Column index of an item in the vocabulary
pub type ItemId = usize;

/// Distinct items seen across all transactions, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Vocabulary {
    items: Vec<String>,
}

impl Vocabulary {
    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no transaction held any item
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Name of the item in column `id`
    pub fn name(&self, id: ItemId) -> Option<&str> {
        self.items.get(id).map(String::as_str)
    }

    /// Column of the item called `name`
    pub fn id(&self, name: &str) -> Option<ItemId> {
        self.items
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .ok()
    }

    /// Names for a list of ids, in the order given; unknown ids are skipped
    pub fn names(&self, ids: &[ItemId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| self.items.get(id).cloned())
            .collect()
    }

    /// Item names in id order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Item names indexed by id
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

/// Read-only boolean view: rows are transactions, columns are vocabulary items
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMatrix {
    cells: Array2<bool>,
}

impl TransactionMatrix {
    /// Number of rows
    pub fn n_transactions(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of columns, equal to the vocabulary size
    pub fn n_items(&self) -> usize {
        self.cells.ncols()
    }

    /// True when there are no transactions
    pub fn is_empty(&self) -> bool {
        self.cells.nrows() == 0
    }

    /// Whether transaction `row` contains item `item`
    pub fn contains(&self, row: usize, item: ItemId) -> bool {
        self.cells
            .get((row, item))
            .copied()
            .unwrap_or(false)
    }

    /// Items of one transaction, ascending
    pub fn row_items(&self, row: usize) -> Vec<ItemId> {
        self.cells
            .row(row)
            .iter()
            .enumerate()
            .filter_map(|(item, &present)| present.then_some(item))
            .collect()
    }

    /// Number of transactions containing every item in `items`
    pub fn support_count(&self, items: &[ItemId]) -> usize {
        self.cells
            .outer_iter()
            .filter(|row| items.iter().all(|&item| row[item]))
            .count()
    }

    /// Number of transactions containing each item, indexed by item id
    pub fn column_counts(&self) -> Vec<usize> {
        self.cells
            .columns()
            .into_iter()
            .map(|column| column.iter().filter(|&&present| present).count())
            .collect()
    }

    /// Underlying boolean cells
    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }
}

/// Split a raw item string into normalized items.
///
/// Pieces are trimmed, empty pieces dropped, and repeats collapsed keeping the
/// first occurrence.
pub fn split_items(raw: &str, delimiter: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}

/// Encode raw records, reading items from `field`.
///
/// Zero records produce an empty vocabulary and an empty matrix. A record
/// without `field` fails the whole call with `InputFormat`.
pub fn encode(
    records: &[RawRecord],
    field: &str,
    delimiter: &str,
) -> Result<(Vocabulary, TransactionMatrix)> {
    if delimiter.is_empty() {
        return Err(MiningError::invalid_parameter(
            "delimiter",
            "\"\"",
            "a non-empty separator",
        ));
    }

    let transactions = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .get(field)
                .map(|raw| split_items(raw, delimiter))
                .ok_or_else(|| {
                    MiningError::input_format_at(
                        index,
                        format!("record {} has no field '{}'", index, field),
                    )
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(encode_transactions(&transactions))
}

/// Encode transactions that are already split into item lists.
///
/// Items are trimmed and empty names skipped, as in [`split_items`].
pub fn encode_transactions<S: AsRef<str>>(
    transactions: &[Vec<S>],
) -> (Vocabulary, TransactionMatrix) {
    let distinct: BTreeSet<&str> = transactions
        .iter()
        .flatten()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .collect();

    let vocabulary = Vocabulary {
        items: distinct.into_iter().map(str::to_string).collect(),
    };

    let mut cells = Array2::from_elem((transactions.len(), vocabulary.len()), false);
    for (row, transaction) in transactions.iter().enumerate() {
        for item in transaction {
            if let Some(column) = vocabulary.id(item.as_ref().trim()) {
                cells[[row, column]] = true;
            }
        }
    }

    (vocabulary, TransactionMatrix { cells })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(field: &str, value: &str) -> RawRecord {
        let mut record = RawRecord::default();
        record.insert(field, value);
        record
    }

    #[test]
    fn test_split_items_normalizes() {
        assert_eq!(
            split_items(" Paracetamol, Ibuprofen ,,Paracetamol , ", ","),
            vec!["Paracetamol", "Ibuprofen"]
        );
        assert!(split_items("", ",").is_empty());
        assert_eq!(split_items("A;B", ";"), vec!["A", "B"]);
    }

    #[test]
    fn test_encode_sorts_vocabulary() {
        let records = vec![
            record("DrugsPrescribed", "Ibuprofen, Paracetamol"),
            record("DrugsPrescribed", "Amoxicillin"),
            record("DrugsPrescribed", "Paracetamol,Paracetamol"),
        ];

        let (vocabulary, matrix) = encode(&records, "DrugsPrescribed", ",").unwrap();

        assert_eq!(
            vocabulary.as_slice(),
            &["Amoxicillin", "Ibuprofen", "Paracetamol"]
        );
        assert_eq!(matrix.n_transactions(), 3);
        assert_eq!(matrix.n_items(), 3);
        assert_eq!(matrix.row_items(0), vec![1, 2]);
        assert_eq!(matrix.row_items(1), vec![0]);
        assert_eq!(matrix.row_items(2), vec![2]);
        assert_eq!(matrix.column_counts(), vec![1, 1, 2]);
    }

    #[test]
    fn test_names_skip_unknown_ids() {
        let (vocabulary, _) = encode_transactions(&[vec!["Aspirin", "Warfarin"]]);
        assert_eq!(vocabulary.names(&[1, 0]), vec!["Warfarin", "Aspirin"]);
        assert_eq!(vocabulary.names(&[0, 7]), vec!["Aspirin"]);
    }

    #[test]
    fn test_no_column_is_all_false() {
        let records = vec![record("items", "a,b"), record("items", ""), record("items", "c")];
        let (_, matrix) = encode(&records, "items", ",").unwrap();

        assert_eq!(matrix.n_transactions(), 3);
        assert!(matrix.column_counts().iter().all(|&count| count > 0));
        assert!(matrix.row_items(1).is_empty());
    }

    #[test]
    fn test_encode_empty_input() {
        let (vocabulary, matrix) = encode(&[], "items", ",").unwrap();
        assert!(vocabulary.is_empty());
        assert!(matrix.is_empty());
        assert_eq!(matrix.n_items(), 0);
    }

    #[test]
    fn test_encode_missing_field() {
        let records = vec![record("items", "a"), record("other", "b")];
        let err = encode(&records, "items", ",").unwrap_err();
        assert!(matches!(
            err,
            MiningError::InputFormat {
                record: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_encode_rejects_empty_delimiter() {
        let records = vec![record("items", "a")];
        assert!(encode(&records, "items", "").unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode_transactions(&[vec!["z", "a"], vec!["m"]]);
        let second = encode_transactions(&[vec!["m"], vec!["a", "z"]]);
        assert_eq!(first.0, second.0);
        assert_eq!(first.0.id("m"), Some(1));
        assert_eq!(first.0.name(2), Some("z"));
        assert_eq!(first.0.id("q"), None);
    }

    #[test]
    fn test_support_count() {
        let (vocabulary, matrix) =
            encode_transactions(&[vec!["X", "Y"], vec!["X", "Y"], vec!["X"], vec!["Y", "Z"]]);
        let x = vocabulary.id("X").unwrap();
        let y = vocabulary.id("Y").unwrap();
        let z = vocabulary.id("Z").unwrap();

        assert_eq!(matrix.support_count(&[x]), 3);
        assert_eq!(matrix.support_count(&[x, y]), 2);
        assert_eq!(matrix.support_count(&[x, z]), 0);
        assert!(matrix.contains(3, z));
        assert!(!matrix.contains(3, x));
        assert!(!matrix.contains(10, x));
    }
}
