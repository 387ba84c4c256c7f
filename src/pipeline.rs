//! Analysis session: encode once, mine and derive rules per threshold set
//!
//! The encoded matrix depends only on the raw input, so a session keeps it and
//! every call to [`AnalysisSession::analyze`] reruns mining and rule
//! generation from scratch over the same matrix.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::data::{load_records, RawRecord};
use crate::encoder::{encode, TransactionMatrix, Vocabulary};
use crate::error::{validate_min_confidence, validate_min_lift, validate_min_support, Result};
use crate::miner::{mine_with_max_len, FrequentItemsets};
use crate::rules::{generate_rules, AssociationRule};

/// Thresholds used for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiningParameters {
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub max_len: Option<usize>,
}

impl MiningParameters {
    /// Check every threshold before any mining work
    pub fn validate(&self) -> Result<()> {
        validate_min_support(self.min_support)?;
        validate_min_confidence(self.min_confidence)?;
        validate_min_lift(self.min_lift)
    }
}

impl From<&AnalysisConfig> for MiningParameters {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            min_support: config.min_support,
            min_confidence: config.min_confidence,
            min_lift: config.min_lift,
            max_len: config.max_len,
        }
    }
}

/// Complete output of one run
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub parameters: MiningParameters,
    pub frequent: FrequentItemsets,
    pub rules: Vec<AssociationRule>,
}

impl AnalysisResult {
    /// True when the thresholds admitted no itemsets at all
    pub fn no_itemsets(&self) -> bool {
        self.frequent.is_empty()
    }

    /// True when no rule met the confidence and lift thresholds
    pub fn no_rules(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Raw records plus their memoized encoding
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    records: Vec<RawRecord>,
    vocabulary: Vocabulary,
    matrix: TransactionMatrix,
}

impl AnalysisSession {
    /// Encode `records`, reading items from `field`
    pub fn from_records(records: Vec<RawRecord>, field: &str, delimiter: &str) -> Result<Self> {
        let (vocabulary, matrix) = encode(&records, field, delimiter)?;
        info!(
            "Encoded {} transactions over {} distinct items",
            matrix.n_transactions(),
            vocabulary.len()
        );

        Ok(Self {
            records,
            vocabulary,
            matrix,
        })
    }

    /// Load and encode a CSV file using the config's field and delimiter
    pub fn from_csv(file_path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<Self> {
        let records = load_records(file_path, &config.field)?;
        Self::from_records(records, &config.field, &config.delimiter)
    }

    /// Loaded records, including passthrough metadata
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn matrix(&self) -> &TransactionMatrix {
        &self.matrix
    }

    /// Number of encoded transactions
    pub fn n_transactions(&self) -> usize {
        self.matrix.n_transactions()
    }

    /// Mine itemsets and derive rules for one set of thresholds.
    ///
    /// All thresholds are checked before the matrix is scanned.
    pub fn analyze(&self, parameters: MiningParameters) -> Result<AnalysisResult> {
        parameters.validate()?;

        let frequent = mine_with_max_len(&self.matrix, parameters.min_support, parameters.max_len)?;
        for level in frequent.levels() {
            debug!(
                "Level {}: {} candidates, {} frequent",
                level.k, level.candidates, level.frequent
            );
        }
        info!(
            "Found {} frequent itemsets at min_support {}",
            frequent.len(),
            parameters.min_support
        );

        let rules = generate_rules(&frequent, parameters.min_confidence, parameters.min_lift)?;
        info!(
            "Derived {} rules at min_confidence {} and min_lift {}",
            rules.len(),
            parameters.min_confidence,
            parameters.min_lift
        );

        Ok(AnalysisResult {
            parameters,
            frequent,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AnalysisSession {
        let records: Vec<RawRecord> = [
            "Paracetamol, Ibuprofen",
            "Paracetamol,Ibuprofen",
            "Paracetamol",
            "Ibuprofen, Omeprazole",
            "Metformin, Insulin",
            "Metformin,Insulin",
        ]
        .iter()
        .map(|drugs| {
            vec![("Condition", "Flu"), ("DrugsPrescribed", *drugs)]
                .into_iter()
                .collect()
        })
        .collect();
        AnalysisSession::from_records(records, "DrugsPrescribed", ",").unwrap()
    }

    fn parameters(min_support: f64, min_confidence: f64, min_lift: f64) -> MiningParameters {
        MiningParameters {
            min_support,
            min_confidence,
            min_lift,
            max_len: None,
        }
    }

    #[test]
    fn test_session_encodes_once() {
        let session = session();
        assert_eq!(session.n_transactions(), 6);
        assert_eq!(session.vocabulary().len(), 5);
        assert_eq!(session.records().len(), 6);
    }

    #[test]
    fn test_analyze_finds_pairs() {
        let session = session();
        let result = session.analyze(parameters(0.3, 0.5, 1.0)).unwrap();

        let vocabulary = session.vocabulary();
        let insulin = vocabulary.id("Insulin").unwrap();
        let metformin = vocabulary.id("Metformin").unwrap();
        assert!(result.frequent.contains(&[insulin, metformin]));

        // Insulin <-> Metformin have lift 3 and rank first
        let top = &result.rules[0];
        assert_eq!(top.union(), vec![insulin, metformin]);
        assert!((top.lift - 3.0).abs() < 1e-12);
        assert!(!result.no_rules());
    }

    #[test]
    fn test_rerun_with_stricter_thresholds() {
        let session = session();
        let loose = session.analyze(parameters(0.3, 0.5, 1.0)).unwrap();
        let strict = session.analyze(parameters(0.9, 0.5, 1.0)).unwrap();

        assert!(strict.no_itemsets());
        assert!(strict.no_rules());
        assert!(loose.frequent.len() > strict.frequent.len());
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        let session = session();
        assert!(session
            .analyze(parameters(1.5, 0.5, 1.0))
            .unwrap_err()
            .is_invalid_parameter());
        assert!(session
            .analyze(parameters(0.3, 0.5, -2.0))
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn test_parameters_from_config() {
        let config = AnalysisConfig::default().with_max_len(Some(2));
        let parameters = MiningParameters::from(&config);
        assert_eq!(parameters.min_support, 0.05);
        assert_eq!(parameters.max_len, Some(2));
    }

    #[test]
    fn test_empty_session() {
        let session = AnalysisSession::from_records(Vec::new(), "DrugsPrescribed", ",").unwrap();
        let result = session.analyze(parameters(0.5, 0.5, 1.0)).unwrap();
        assert!(result.no_itemsets());
        assert!(result.no_rules());
    }
}
