//! Error types for ruleforge
//!
//! Input problems and bad thresholds are distinguished so a caller can tell
//! "fix your data" apart from "fix your parameters". An analysis that finds
//! nothing is not an error and never surfaces here.

use std::io;

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MiningError>;

/// Errors raised by loading, encoding, mining and rule generation
#[derive(Error, Debug)]
pub enum MiningError {
    /// Raw data is missing the item field or is otherwise structurally invalid
    #[error("Input format error: {message}")]
    InputFormat {
        /// Error description
        message: String,
        /// Zero-based record index, when the problem is tied to one record
        record: Option<usize>,
    },

    /// A threshold or option lies outside its valid domain
    #[error("Invalid parameter '{name}' = {value}: expected {expected}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value as given
        value: String,
        /// Human-readable description of the valid domain
        expected: &'static str,
    },

    /// CSV could not be read or parsed
    #[error("CSV error: {0}")]
    Csv(#[from] polars::error::PolarsError),

    /// File system errors (config, JSON export)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid YAML for `AnalysisConfig`
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// JSON export failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart rendering failed
    #[error("Plotting error: {0}")]
    Plot(String),
}

impl MiningError {
    /// Input format error not tied to a specific record
    pub fn input_format(message: impl Into<String>) -> Self {
        Self::InputFormat {
            message: message.into(),
            record: None,
        }
    }

    /// Input format error for one record
    pub fn input_format_at(record: usize, message: impl Into<String>) -> Self {
        Self::InputFormat {
            message: message.into(),
            record: Some(record),
        }
    }

    /// Threshold or option outside its domain
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            expected,
        }
    }

    /// True for problems with the input data itself
    pub fn is_input_format(&self) -> bool {
        matches!(self, Self::InputFormat { .. })
    }

    /// True for out-of-range thresholds or options
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

/// Check that `min_support` lies in (0, 1]
pub fn validate_min_support(min_support: f64) -> Result<()> {
    if min_support > 0.0 && min_support <= 1.0 {
        Ok(())
    } else {
        Err(MiningError::invalid_parameter(
            "min_support",
            min_support,
            "a fraction in (0, 1]",
        ))
    }
}

/// Check that `min_confidence` lies in [0, 1]
pub fn validate_min_confidence(min_confidence: f64) -> Result<()> {
    if (0.0..=1.0).contains(&min_confidence) {
        Ok(())
    } else {
        Err(MiningError::invalid_parameter(
            "min_confidence",
            min_confidence,
            "a fraction in [0, 1]",
        ))
    }
}

/// Check that `min_lift` is a non-negative number
pub fn validate_min_lift(min_lift: f64) -> Result<()> {
    // NaN fails the comparison and is rejected too
    if min_lift >= 0.0 {
        Ok(())
    } else {
        Err(MiningError::invalid_parameter(
            "min_lift",
            min_lift,
            "a value >= 0",
        ))
    }
}
