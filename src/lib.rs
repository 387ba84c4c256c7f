//! RuleForge: frequent itemset mining and association rules for prescription data
//!
//! Raw records are encoded into a boolean transaction matrix, frequent
//! itemsets are mined level by level with anti-monotone pruning, and rules
//! are derived from them and ranked by lift and confidence.

pub mod cli;
pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod miner;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use config::AnalysisConfig;
pub use data::{load_records, RawRecord};
pub use encoder::{encode, encode_transactions, ItemId, TransactionMatrix, Vocabulary};
pub use error::{MiningError, Result};
pub use miner::{mine, mine_with_max_len, FrequentItemsets, Itemset, LevelStats};
pub use pipeline::{AnalysisResult, AnalysisSession, MiningParameters};
pub use rules::{generate_rules, AssociationRule};
