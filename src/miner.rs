//! Level-wise frequent itemset mining
//!
//! Candidates of size k are joined from frequent (k-1)-itemsets sharing their
//! first k-2 items, then pruned unless every (k-1)-subset is frequent. Only
//! survivors are counted against the matrix.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;

use crate::encoder::{ItemId, TransactionMatrix};
use crate::error::{validate_min_support, MiningError, Result};

/// A frequent itemset with its support
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itemset {
    /// Item ids in ascending (canonical) order
    pub items: Vec<ItemId>,
    /// Number of transactions containing every item
    pub support_count: usize,
    /// `support_count / n_transactions`
    pub support: f64,
}

impl Itemset {
    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for mined itemsets
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Candidate and survivor counts for one level of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelStats {
    /// Itemset size at this level
    pub k: usize,
    /// Candidates whose support was counted
    pub candidates: usize,
    /// Candidates that met the support threshold
    pub frequent: usize,
}

/// All frequent itemsets found in one run, indexed by content
#[derive(Debug, Clone)]
pub struct FrequentItemsets {
    n_transactions: usize,
    min_support: f64,
    itemsets: Vec<Itemset>,
    index: HashMap<Vec<ItemId>, usize>,
    levels: Vec<LevelStats>,
}

impl FrequentItemsets {
    fn new(n_transactions: usize, min_support: f64) -> Self {
        Self {
            n_transactions,
            min_support,
            itemsets: Vec::new(),
            index: HashMap::new(),
            levels: Vec::new(),
        }
    }

    fn push(&mut self, items: Vec<ItemId>, support_count: usize) {
        let support = support_count as f64 / self.n_transactions as f64;
        self.index.insert(items.clone(), self.itemsets.len());
        self.itemsets.push(Itemset {
            items,
            support_count,
            support,
        });
    }

    /// Number of frequent itemsets across all sizes
    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    /// True when nothing met the threshold. This is a valid outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Transactions in the mined matrix
    pub fn n_transactions(&self) -> usize {
        self.n_transactions
    }

    /// Threshold the itemsets were mined at
    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    /// Itemsets in discovery order: by size, then canonical order within a size
    pub fn iter(&self) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter()
    }

    /// Look up an itemset by its canonical (ascending) item ids
    pub fn get(&self, items: &[ItemId]) -> Option<&Itemset> {
        self.index.get(items).map(|&position| &self.itemsets[position])
    }

    /// Whether `items` (canonical order) is frequent
    pub fn contains(&self, items: &[ItemId]) -> bool {
        self.index.contains_key(items)
    }

    /// Size of the largest frequent itemset, 0 when empty
    pub fn max_len(&self) -> usize {
        self.itemsets.iter().map(Itemset::len).max().unwrap_or(0)
    }

    /// Per-level candidate and survivor counts, smallest size first
    pub fn levels(&self) -> &[LevelStats] {
        &self.levels
    }

    /// Itemsets ordered for presentation: support descending, then shorter
    /// first, then canonical item order
    pub fn by_support(&self) -> Vec<&Itemset> {
        let mut sorted: Vec<&Itemset> = self.itemsets.iter().collect();
        sorted.sort_by(|a, b| {
            b.support_count
                .cmp(&a.support_count)
                .then_with(|| a.len().cmp(&b.len()))
                .then_with(|| a.items.cmp(&b.items))
        });
        sorted
    }
}

/// Mine every itemset whose support is at least `min_support`
///
/// # Arguments
/// * `matrix` - Encoded transactions
/// * `min_support` - Minimum fraction of transactions, in (0, 1]
///
/// # Returns
/// * All frequent itemsets of every size. Empty when nothing qualifies or the
///   matrix has no rows.
pub fn mine(matrix: &TransactionMatrix, min_support: f64) -> Result<FrequentItemsets> {
    mine_with_max_len(matrix, min_support, None)
}

/// Same as [`mine`] but stops after itemsets of size `max_len`
pub fn mine_with_max_len(
    matrix: &TransactionMatrix,
    min_support: f64,
    max_len: Option<usize>,
) -> Result<FrequentItemsets> {
    validate_min_support(min_support)?;
    if max_len == Some(0) {
        return Err(MiningError::invalid_parameter(
            "max_len",
            0,
            "at least 1 when set",
        ));
    }

    let n_transactions = matrix.n_transactions();
    let mut result = FrequentItemsets::new(n_transactions, min_support);
    if n_transactions == 0 {
        return Ok(result);
    }

    let is_frequent = |count: usize| count as f64 / n_transactions as f64 >= min_support;

    let mut current: Vec<Vec<ItemId>> = Vec::new();
    let column_counts = matrix.column_counts();
    for (item, &count) in column_counts.iter().enumerate() {
        if is_frequent(count) {
            result.push(vec![item], count);
            current.push(vec![item]);
        }
    }
    result.levels.push(LevelStats {
        k: 1,
        candidates: column_counts.len(),
        frequent: current.len(),
    });

    let mut k = 2;
    while !current.is_empty() && max_len.map_or(true, |limit| k <= limit) {
        let candidates = generate_candidates(&current);
        if candidates.is_empty() {
            break;
        }

        // Each candidate is counted independently, so the collected order
        // matches the sequential order.
        let counts: Vec<usize> = candidates
            .par_iter()
            .map(|candidate| matrix.support_count(candidate))
            .collect();

        let n_candidates = candidates.len();
        let mut next = Vec::new();
        for (candidate, count) in candidates.into_iter().zip(counts) {
            if is_frequent(count) {
                result.push(candidate.clone(), count);
                next.push(candidate);
            }
        }
        result.levels.push(LevelStats {
            k,
            candidates: n_candidates,
            frequent: next.len(),
        });

        current = next;
        k += 1;
    }

    Ok(result)
}

/// Join and prune step.
///
/// `previous` must hold same-size itemsets in ascending lexicographic order;
/// the output keeps that order.
pub fn generate_candidates(previous: &[Vec<ItemId>]) -> Vec<Vec<ItemId>> {
    let Some(size) = previous.first().map(Vec::len) else {
        return Vec::new();
    };
    let prefix_len = size - 1;
    let known: HashSet<&[ItemId]> = previous.iter().map(Vec::as_slice).collect();

    let mut candidates = Vec::new();
    for (i, left) in previous.iter().enumerate() {
        for right in &previous[i + 1..] {
            if left[..prefix_len] != right[..prefix_len] {
                // sorted input: no later itemset shares this prefix
                break;
            }

            let mut candidate = left.clone();
            candidate.push(right[prefix_len]);
            if all_subsets_known(&candidate, &known) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn all_subsets_known(candidate: &[ItemId], known: &HashSet<&[ItemId]>) -> bool {
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    (0..candidate.len()).all(|skip| {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|&(position, _)| position != skip)
                .map(|(_, &item)| item),
        );
        known.contains(subset.as_slice())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_transactions;
    use approx::assert_relative_eq;

    fn scenario_a() -> (crate::encoder::Vocabulary, TransactionMatrix) {
        encode_transactions(&[vec!["X", "Y"], vec!["X", "Y"], vec!["X"], vec!["Y", "Z"]])
    }

    #[test]
    fn test_mine_scenario_a() {
        let (vocabulary, matrix) = scenario_a();
        let frequent = mine(&matrix, 0.5).unwrap();

        assert_eq!(frequent.len(), 3);
        let x = vocabulary.id("X").unwrap();
        let y = vocabulary.id("Y").unwrap();
        let z = vocabulary.id("Z").unwrap();

        assert_relative_eq!(frequent.get(&[x]).unwrap().support, 0.75);
        assert_relative_eq!(frequent.get(&[y]).unwrap().support, 0.75);
        assert_relative_eq!(frequent.get(&[x, y]).unwrap().support, 0.5);
        assert_eq!(frequent.get(&[x, y]).unwrap().support_count, 2);
        assert!(!frequent.contains(&[z]));
        assert_eq!(frequent.max_len(), 2);
    }

    #[test]
    fn test_threshold_too_high_gives_empty_result() {
        let (_, matrix) = scenario_a();
        let frequent = mine(&matrix, 1.0).unwrap();
        assert!(frequent.is_empty());
        assert_eq!(frequent.levels().len(), 1);
    }

    #[test]
    fn test_invalid_min_support_fails_before_scan() {
        let (_, matrix) = scenario_a();
        assert!(mine(&matrix, 1.5).unwrap_err().is_invalid_parameter());
        assert!(mine(&matrix, 0.0).unwrap_err().is_invalid_parameter());

        let (_, empty) = encode_transactions::<&str>(&[]);
        assert!(mine(&empty, -0.2).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_empty_matrix() {
        let (_, matrix) = encode_transactions::<&str>(&[]);
        let frequent = mine(&matrix, 0.1).unwrap();
        assert!(frequent.is_empty());
        assert_eq!(frequent.n_transactions(), 0);
    }

    #[test]
    fn test_three_itemsets() {
        let (vocabulary, matrix) = encode_transactions(&[
            vec!["a", "b", "c"],
            vec!["a", "b", "c"],
            vec!["a", "b"],
            vec!["c", "d"],
        ]);
        let frequent = mine(&matrix, 0.5).unwrap();

        let abc: Vec<ItemId> = ["a", "b", "c"]
            .iter()
            .map(|name| vocabulary.id(name).unwrap())
            .collect();
        assert_eq!(frequent.get(&abc).unwrap().support_count, 2);
        assert_eq!(frequent.max_len(), 3);
        assert_eq!(
            frequent.levels(),
            &[
                LevelStats { k: 1, candidates: 4, frequent: 3 },
                LevelStats { k: 2, candidates: 3, frequent: 3 },
                LevelStats { k: 3, candidates: 1, frequent: 1 },
            ]
        );
    }

    #[test]
    fn test_max_len_caps_search() {
        let (_, matrix) = encode_transactions(&[vec!["a", "b", "c"], vec!["a", "b", "c"]]);
        let frequent = mine_with_max_len(&matrix, 0.5, Some(2)).unwrap();
        assert_eq!(frequent.max_len(), 2);
        assert_eq!(frequent.len(), 6);
        assert!(mine_with_max_len(&matrix, 0.5, Some(0)).is_err());
    }

    #[test]
    fn test_generate_candidates_prunes() {
        // {1,2} and {1,3} join to {1,2,3}, but {2,3} is not frequent
        let previous = vec![vec![1, 2], vec![1, 3], vec![2, 4]];
        assert!(generate_candidates(&previous).is_empty());

        let previous = vec![vec![1, 2], vec![1, 3], vec![2, 3]];
        assert_eq!(generate_candidates(&previous), vec![vec![1, 2, 3]]);

        let singles = vec![vec![0], vec![2], vec![5]];
        assert_eq!(
            generate_candidates(&singles),
            vec![vec![0, 2], vec![0, 5], vec![2, 5]]
        );
        assert!(generate_candidates(&[]).is_empty());
    }

    #[test]
    fn test_by_support_ordering() {
        let (vocabulary, matrix) = scenario_a();
        let frequent = mine(&matrix, 0.25).unwrap();
        let ordered: Vec<Vec<String>> = frequent
            .by_support()
            .iter()
            .map(|itemset| vocabulary.names(&itemset.items))
            .collect();

        assert_eq!(ordered[0], vec!["X"]);
        assert_eq!(ordered[1], vec!["Y"]);
        assert_eq!(ordered[2], vec!["X", "Y"]);
        assert!(frequent
            .by_support()
            .windows(2)
            .all(|pair| pair[0].support >= pair[1].support));
    }
}
