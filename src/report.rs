//! Console tables and JSON export of analysis results

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::data::RawRecord;
use crate::encoder::Vocabulary;
use crate::error::Result;
use crate::miner::{FrequentItemsets, Itemset, LevelStats};
use crate::pipeline::{AnalysisResult, AnalysisSession, MiningParameters};
use crate::rules::AssociationRule;

/// A frequent itemset with item names resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemsetView {
    pub items: Vec<String>,
    pub support: f64,
    pub support_count: usize,
    pub length: usize,
}

impl ItemsetView {
    pub fn new(itemset: &Itemset, vocabulary: &Vocabulary) -> Self {
        Self {
            items: vocabulary.names(&itemset.items),
            support: itemset.support,
            support_count: itemset.support_count,
            length: itemset.len(),
        }
    }
}

/// An association rule with item names resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleView {
    pub antecedents: Vec<String>,
    pub consequents: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    pub conviction: f64,
}

impl RuleView {
    pub fn new(rule: &AssociationRule, vocabulary: &Vocabulary) -> Self {
        Self {
            antecedents: vocabulary.names(&rule.antecedent),
            consequents: vocabulary.names(&rule.consequent),
            support: rule.support,
            confidence: rule.confidence,
            lift: rule.lift,
            leverage: rule.leverage,
            conviction: rule.conviction,
        }
    }

    /// "A, B -> C"
    pub fn label(&self) -> String {
        format!(
            "{} -> {}",
            self.antecedents.join(", "),
            self.consequents.join(", ")
        )
    }
}

/// Itemsets in presentation order (support descending)
pub fn itemset_views(frequent: &FrequentItemsets, vocabulary: &Vocabulary) -> Vec<ItemsetView> {
    frequent
        .by_support()
        .into_iter()
        .map(|itemset| ItemsetView::new(itemset, vocabulary))
        .collect()
}

/// Rules in ranking order
pub fn rule_views(rules: &[AssociationRule], vocabulary: &Vocabulary) -> Vec<RuleView> {
    rules
        .iter()
        .map(|rule| RuleView::new(rule, vocabulary))
        .collect()
}

#[derive(Tabled)]
struct ItemsetRow {
    itemsets: String,
    support: String,
    length: usize,
}

#[derive(Tabled)]
struct RuleRow {
    antecedents: String,
    consequents: String,
    support: String,
    confidence: String,
    lift: String,
}

/// First `top` itemsets as a table
pub fn itemset_table(views: &[ItemsetView], top: usize) -> String {
    let rows = views.iter().take(top).map(|view| ItemsetRow {
        itemsets: view.items.join(", "),
        support: format!("{:.4}", view.support),
        length: view.length,
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// First `top` rules as a table
pub fn rule_table(views: &[RuleView], top: usize) -> String {
    let rows = views.iter().take(top).map(|view| RuleRow {
        antecedents: view.antecedents.join(", "),
        consequents: view.consequents.join(", "),
        support: format!("{:.4}", view.support),
        confidence: format!("{:.4}", view.confidence),
        lift: format!("{:.4}", view.lift),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// First `n` raw records, every field included
pub fn sample_table(records: &[RawRecord], n: usize) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let header: Vec<String> = first.field_names().map(str::to_string).collect();
    let rows = std::iter::once(header).chain(
        records
            .iter()
            .take(n)
            .map(|record| record.values().map(str::to_string).collect()),
    );
    Table::from_iter(rows).with(Style::rounded()).to_string()
}

/// Print itemsets and rules, with guidance when a section is empty
pub fn print_report(session: &AnalysisSession, result: &AnalysisResult, top: usize) {
    let vocabulary = session.vocabulary();
    let parameters = &result.parameters;

    println!("\n=== Frequent Itemsets ===");
    println!(
        "Itemsets appearing in at least {:.1}% of {} transactions",
        parameters.min_support * 100.0,
        session.n_transactions()
    );
    if result.no_itemsets() {
        println!("No frequent itemsets found with the current minimum support. Try decreasing it.");
    } else {
        let views = itemset_views(&result.frequent, vocabulary);
        println!("{}", itemset_table(&views, top));
        println!("Found {} frequent itemsets.", views.len());
    }

    println!("\n=== Association Rules ===");
    println!(
        "Rules with at least {:.1}% confidence and {:.2} lift",
        parameters.min_confidence * 100.0,
        parameters.min_lift
    );
    if result.no_itemsets() {
        println!("Cannot generate association rules because no frequent itemsets were found.");
    } else if result.no_rules() {
        println!("No association rules found with the current thresholds. Try adjusting them.");
    } else {
        let views = rule_views(&result.rules, vocabulary);
        println!("{}", rule_table(&views, top));
        println!("Found {} association rules.", views.len());
    }
}

/// Everything a run produced, in serializable form
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub parameters: &'a MiningParameters,
    pub n_transactions: usize,
    pub vocabulary: &'a Vocabulary,
    pub levels: &'a [LevelStats],
    pub frequent_itemsets: Vec<ItemsetView>,
    pub rules: Vec<RuleView>,
}

impl<'a> JsonReport<'a> {
    pub fn new(session: &'a AnalysisSession, result: &'a AnalysisResult) -> Self {
        let vocabulary = session.vocabulary();
        Self {
            parameters: &result.parameters,
            n_transactions: session.n_transactions(),
            vocabulary,
            levels: result.frequent.levels(),
            frequent_itemsets: itemset_views(&result.frequent, vocabulary),
            rules: rule_views(&result.rules, vocabulary),
        }
    }
}

/// Write the report as pretty-printed JSON. Infinite conviction becomes `null`.
pub fn write_json_report(report: &JsonReport<'_>, output_path: impl AsRef<Path>) -> Result<()> {
    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
