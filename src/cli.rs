//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::config::AnalysisConfig;

/// Discover co-prescribed drugs with frequent itemsets and association rules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "prescriptions.csv")]
    pub input: String,

    /// YAML file with analysis settings; flags below override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Column holding the delimiter-separated item list
    #[arg(short, long)]
    pub field: Option<String>,

    /// Separator between items inside the item column
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Minimum support for frequent itemsets, in (0, 1]
    #[arg(short = 's', long)]
    pub min_support: Option<f64>,

    /// Minimum confidence for association rules, in [0, 1]
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Minimum lift for association rules, >= 0
    #[arg(long)]
    pub min_lift: Option<f64>,

    /// Largest itemset size to search
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Number of rows to show per table
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Number of raw records to show as a sample (0 to skip)
    #[arg(long, default_value = "10")]
    pub sample: usize,

    /// Write itemsets and rules as JSON to this path
    #[arg(long)]
    pub json: Option<String>,

    /// Write bar charts of top rules and itemsets to this PNG path
    #[arg(short, long)]
    pub plot: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the effective configuration: file (or defaults), then flags
    pub fn resolve_config(&self) -> crate::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_yaml_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(field) = &self.field {
            config.field = field.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if let Some(min_support) = self.min_support {
            config.min_support = min_support;
        }
        if let Some(min_confidence) = self.min_confidence {
            config.min_confidence = min_confidence;
        }
        if let Some(min_lift) = self.min_lift {
            config.min_lift = min_lift;
        }
        if self.max_len.is_some() {
            config.max_len = self.max_len;
        }
        if let Some(top) = self.top {
            config.top = top;
        }

        config.validate()?;
        Ok(config)
    }
}
