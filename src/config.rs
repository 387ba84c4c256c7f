//! Analysis configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{
    validate_min_confidence, validate_min_lift, validate_min_support, MiningError, Result,
};

/// Thresholds and input settings for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// CSV column holding the item list
    pub field: String,
    /// Separator between items inside `field`
    pub delimiter: String,
    /// Minimum itemset support, in (0, 1]
    pub min_support: f64,
    /// Minimum rule confidence, in [0, 1]
    pub min_confidence: f64,
    /// Minimum rule lift, >= 0
    pub min_lift: f64,
    /// Largest itemset size to search (None = unbounded)
    pub max_len: Option<usize>,
    /// Rows shown per table
    pub top: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            field: "DrugsPrescribed".to_string(),
            delimiter: ",".to_string(),
            min_support: 0.05,
            min_confidence: 0.5,
            min_lift: 1.0,
            max_len: None,
            top: 20,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file; missing keys take their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = min_lift;
        self
    }

    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Check every setting before any data is touched
    pub fn validate(&self) -> Result<()> {
        validate_min_support(self.min_support)?;
        validate_min_confidence(self.min_confidence)?;
        validate_min_lift(self.min_lift)?;

        if self.field.trim().is_empty() {
            return Err(MiningError::invalid_parameter(
                "field",
                "\"\"",
                "a column name",
            ));
        }
        if self.delimiter.is_empty() {
            return Err(MiningError::invalid_parameter(
                "delimiter",
                "\"\"",
                "a non-empty separator",
            ));
        }
        if self.max_len == Some(0) {
            return Err(MiningError::invalid_parameter(
                "max_len",
                0,
                "at least 1 when set",
            ));
        }
        Ok(())
    }
}
