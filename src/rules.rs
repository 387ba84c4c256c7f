//! Association rule derivation from frequent itemsets

use std::cmp::Ordering;

use serde::Serialize;

use crate::encoder::ItemId;
use crate::error::{validate_min_confidence, validate_min_lift, MiningError, Result};
use crate::miner::{FrequentItemsets, Itemset};

/// "If the antecedent is present, the consequent tends to be present too"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationRule {
    /// Canonical item ids on the left-hand side
    pub antecedent: Vec<ItemId>,
    /// Canonical item ids on the right-hand side, disjoint from the antecedent
    pub consequent: Vec<ItemId>,
    /// Support of antecedent ∪ consequent
    pub support: f64,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// P(consequent | antecedent)
    pub confidence: f64,
    /// Observed co-occurrence over co-occurrence expected under independence
    pub lift: f64,
    /// support - antecedent_support * consequent_support
    pub leverage: f64,
    /// (1 - consequent_support) / (1 - confidence); infinite for exact rules
    pub conviction: f64,
}

impl AssociationRule {
    /// Antecedent and consequent together, ascending
    pub fn union(&self) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = self
            .antecedent
            .iter()
            .chain(self.consequent.iter())
            .copied()
            .collect();
        items.sort_unstable();
        items
    }
}

/// Derive rules from every frequent itemset of size two or more
///
/// # Arguments
/// * `frequent` - Result of mining; must be closed under taking subsets
/// * `min_confidence` - Minimum confidence, in [0, 1]
/// * `min_lift` - Minimum lift, >= 0
///
/// # Returns
/// * Rules meeting both thresholds, sorted by lift descending, then
///   confidence descending, then antecedent and consequent item order
pub fn generate_rules(
    frequent: &FrequentItemsets,
    min_confidence: f64,
    min_lift: f64,
) -> Result<Vec<AssociationRule>> {
    validate_min_confidence(min_confidence)?;
    validate_min_lift(min_lift)?;

    let mut rules = Vec::new();
    for itemset in frequent.iter().filter(|itemset| itemset.len() >= 2) {
        for (antecedent, consequent) in splits(&itemset.items) {
            let rule = score_rule(frequent, itemset, antecedent, consequent)?;
            if rule.confidence >= min_confidence && rule.lift >= min_lift {
                rules.push(rule);
            }
        }
    }

    rules.sort_by(compare_rules);
    Ok(rules)
}

/// Every split of `items` into two non-empty parts, in both directions
fn splits(items: &[ItemId]) -> Vec<(Vec<ItemId>, Vec<ItemId>)> {
    let n = items.len();
    debug_assert!(n >= 2 && n < usize::BITS as usize);

    (1..(1usize << n) - 1)
        .map(|mask| {
            let (antecedent, consequent): (Vec<(usize, ItemId)>, Vec<(usize, ItemId)>) = items
                .iter()
                .copied()
                .enumerate()
                .partition(|&(position, _)| mask & (1 << position) != 0);
            (
                antecedent.into_iter().map(|(_, item)| item).collect(),
                consequent.into_iter().map(|(_, item)| item).collect(),
            )
        })
        .collect()
}

fn score_rule(
    frequent: &FrequentItemsets,
    itemset: &Itemset,
    antecedent: Vec<ItemId>,
    consequent: Vec<ItemId>,
) -> Result<AssociationRule> {
    let antecedent_set = lookup_subset(frequent, &antecedent)?;
    let consequent_set = lookup_subset(frequent, &consequent)?;

    let n = frequent.n_transactions() as f64;
    let union_count = itemset.support_count as f64;
    let antecedent_count = antecedent_set.support_count as f64;
    let consequent_count = consequent_set.support_count as f64;

    let confidence = union_count / antecedent_count;
    // Same as confidence / consequent_support, written as a product of counts so
    // A -> B and B -> A produce bit-identical values.
    let lift = (union_count * n) / (antecedent_count * consequent_count);
    let leverage = itemset.support - antecedent_set.support * consequent_set.support;
    let conviction = if confidence >= 1.0 {
        f64::INFINITY
    } else {
        (1.0 - consequent_set.support) / (1.0 - confidence)
    };

    Ok(AssociationRule {
        antecedent,
        consequent,
        support: itemset.support,
        antecedent_support: antecedent_set.support,
        consequent_support: consequent_set.support,
        confidence,
        lift,
        leverage,
        conviction,
    })
}

/// Subsets of a frequent itemset are frequent, so a miss means the input
/// collection was not produced by a complete mining run.
fn lookup_subset<'a>(frequent: &'a FrequentItemsets, items: &[ItemId]) -> Result<&'a Itemset> {
    frequent.get(items).ok_or_else(|| {
        MiningError::input_format(format!(
            "frequent itemsets are not closed under subsets: {:?} is missing",
            items
        ))
    })
}

/// Ranking order: lift desc, confidence desc, antecedent asc, consequent asc
pub fn compare_rules(a: &AssociationRule, b: &AssociationRule) -> Ordering {
    b.lift
        .total_cmp(&a.lift)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.antecedent.cmp(&b.antecedent))
        .then_with(|| a.consequent.cmp(&b.consequent))
}
