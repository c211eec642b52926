// src/patterns/rules.rs — Association rules from frequent itemsets
//
// Every frequent itemset I with |I| >= 2 is split into (antecedent,
// consequent) pairs by growing the antecedent one item at a time from each
// singleton seed. The visited-pair set makes the search touch every ordered
// partition of I exactly once (2^k - 2 of them), whichever seed reaches a
// given partition first.

use std::collections::HashSet;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::infra::errors::{MiningError, Result};
use crate::patterns::itemset::Itemset;
use crate::patterns::provider::SupportTable;
use crate::patterns::token::{Token, Vocabulary};

/// A directional rule `antecedent => consequent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    /// Raw count of baskets containing antecedent ∪ consequent.
    pub support: u64,
    pub confidence: f64,
    pub lift: f64,
}

impl Rule {
    /// Support as a fraction of `total` transactions.
    pub fn support_fraction(&self, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.support as f64 / total as f64
    }

    /// antecedent ∪ consequent.
    pub fn itemset(&self) -> Itemset {
        self.antecedent.union(&self.consequent)
    }

    /// Render with tokens in place of item ids.
    pub fn display<'a, T>(&'a self, vocab: &'a Vocabulary<T>, total: u64) -> RuleDisplay<'a, T> {
        RuleDisplay {
            rule: self,
            vocab,
            total,
        }
    }
}

/// `[a, b] => [c] : sup(0.40), conf(0.80), lift(1.33)`
pub struct RuleDisplay<'a, T> {
    rule: &'a Rule,
    vocab: &'a Vocabulary<T>,
    total: u64,
}

impl<T: Token + fmt::Display> fmt::Display for RuleDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tokens(f, self.vocab, &self.rule.antecedent)?;
        f.write_str(" => ")?;
        write_tokens(f, self.vocab, &self.rule.consequent)?;
        write!(
            f,
            " : sup({:.2}), conf({:.2}), lift({:.2})",
            self.rule.support_fraction(self.total),
            self.rule.confidence,
            self.rule.lift
        )
    }
}

pub(crate) fn write_tokens<T: Token + fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    vocab: &Vocabulary<T>,
    items: &Itemset,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, token) in vocab.decode(items.items()).into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{token}")?;
    }
    f.write_str("]")
}

/// (antecedent, consequent) pairs already scored in one run.
pub type VisitedPairs = HashSet<(Itemset, Itemset)>;

/// How the partition search walks the antecedent lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Plain recursion; depth is bounded by the itemset size.
    #[default]
    Recursive,
    /// Explicit stack, same visiting order as `Recursive`.
    Worklist,
}

/// Derives rules from a frequent-itemset support table.
#[derive(Debug, Clone, Copy)]
pub struct RuleGenerator<'a> {
    table: &'a SupportTable,
    total: u64,
    min_support: u64,
    min_confidence: f64,
    min_lift: f64,
    strategy: SearchStrategy,
}

impl<'a> RuleGenerator<'a> {
    /// A generator that accepts every rule; tighten it with the `with_*` setters.
    pub fn new(table: &'a SupportTable, total: u64) -> Self {
        Self {
            table,
            total,
            min_support: 1,
            min_confidence: 0.0,
            min_lift: 0.0,
            strategy: SearchStrategy::default(),
        }
    }

    pub fn with_min_support(mut self, min_support: u64) -> Self {
        self.min_support = min_support;
        self
    }

    /// Rules with confidence equal to the floor are kept.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Rules with lift equal to the floor are dropped.
    pub fn with_min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = min_lift;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Itemsets worth splitting, largest first, ties in itemset order.
    pub fn candidates(&self) -> Vec<(&'a Itemset, u64)> {
        let mut candidates: Vec<(&'a Itemset, u64)> = self
            .table
            .iter()
            .filter(|(set, support)| **support >= self.min_support && set.len() >= 2)
            .map(|(set, support)| (set, *support))
            .collect();
        candidates.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        candidates
    }

    /// Run the search with a fresh visited set.
    pub fn generate(&self) -> Result<Vec<Rule>> {
        let mut visited = VisitedPairs::new();
        self.generate_with(&mut visited)
    }

    /// Run the search, recording scored pairs in `visited`. Pairs already
    /// present are neither rescored nor expanded.
    pub fn generate_with(&self, visited: &mut VisitedPairs) -> Result<Vec<Rule>> {
        let mut rules = Vec::new();
        for (itemset, support) in self.candidates() {
            self.rules_for_itemset(itemset, support, visited, &mut rules)?;
        }
        tracing::debug!(
            "scored {} partitions, kept {} rules",
            visited.len(),
            rules.len()
        );
        Ok(rules)
    }

    /// One rayon task per itemset, each with its own visited set. A pair
    /// (A, B) only ever arises from the itemset A ∪ B, so nothing is lost by
    /// not sharing; output matches `generate`.
    pub fn generate_parallel(&self) -> Result<Vec<Rule>> {
        let per_itemset = self
            .candidates()
            .par_iter()
            .map(|(itemset, support)| -> Result<Vec<Rule>> {
                let mut visited = VisitedPairs::new();
                let mut rules = Vec::new();
                self.rules_for_itemset(itemset, *support, &mut visited, &mut rules)?;
                Ok(rules)
            })
            .collect::<Result<Vec<Vec<Rule>>>>()?;
        Ok(per_itemset.into_iter().flatten().collect())
    }

    fn rules_for_itemset(
        &self,
        itemset: &Itemset,
        support: u64,
        visited: &mut VisitedPairs,
        out: &mut Vec<Rule>,
    ) -> Result<()> {
        match self.strategy {
            SearchStrategy::Recursive => {
                for item in itemset.iter() {
                    self.search(
                        Itemset::singleton(item),
                        itemset.without(item),
                        support,
                        visited,
                        out,
                    )?;
                }
            }
            SearchStrategy::Worklist => {
                // Reverse pushes so pops follow the recursive order
                let mut stack: Vec<(Itemset, Itemset)> = itemset
                    .items()
                    .iter()
                    .rev()
                    .map(|&item| (Itemset::singleton(item), itemset.without(item)))
                    .collect();
                while let Some((antecedent, consequent)) = stack.pop() {
                    if !self.visit(&antecedent, &consequent, support, visited, out)? {
                        continue;
                    }
                    for &item in consequent.items().iter().rev() {
                        stack.push((antecedent.with(item), consequent.without(item)));
                    }
                }
            }
        }
        Ok(())
    }

    fn search(
        &self,
        antecedent: Itemset,
        consequent: Itemset,
        support: u64,
        visited: &mut VisitedPairs,
        out: &mut Vec<Rule>,
    ) -> Result<()> {
        if !self.visit(&antecedent, &consequent, support, visited, out)? {
            return Ok(());
        }
        for item in consequent.iter() {
            self.search(
                antecedent.with(item),
                consequent.without(item),
                support,
                visited,
                out,
            )?;
        }
        Ok(())
    }

    /// Score one partition if it is new. Returns whether the caller should
    /// expand it further.
    fn visit(
        &self,
        antecedent: &Itemset,
        consequent: &Itemset,
        support: u64,
        visited: &mut VisitedPairs,
        out: &mut Vec<Rule>,
    ) -> Result<bool> {
        if consequent.is_empty() {
            return Ok(false);
        }
        if !visited.insert((antecedent.clone(), consequent.clone())) {
            return Ok(false);
        }
        if let Some(rule) = self.score(antecedent, consequent, support)? {
            out.push(rule);
        }
        Ok(true)
    }

    /// Confidence and lift of `antecedent => consequent`, or `None` when the
    /// rule misses a threshold.
    pub fn score(
        &self,
        antecedent: &Itemset,
        consequent: &Itemset,
        support: u64,
    ) -> Result<Option<Rule>> {
        let support_a = self.subset_support(antecedent, support)?;
        let support_b = self.subset_support(consequent, support)?;

        let confidence = support as f64 / support_a as f64;
        let lift = (support as f64 * self.total as f64) / (support_a as f64 * support_b as f64);

        if confidence >= self.min_confidence && lift > self.min_lift {
            Ok(Some(Rule {
                antecedent: antecedent.clone(),
                consequent: consequent.clone(),
                support,
                confidence,
                lift,
            }))
        } else {
            Ok(None)
        }
    }

    fn subset_support(&self, subset: &Itemset, superset_support: u64) -> Result<u64> {
        let support = *self
            .table
            .get(subset)
            .ok_or_else(|| MiningError::contract(subset, "missing subset support"))?;
        if support == 0 {
            return Err(MiningError::contract(subset, "zero support"));
        }
        if support < superset_support {
            return Err(MiningError::contract(
                subset,
                format!("support {support} below superset support {superset_support}"),
            ));
        }
        Ok(support)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::token::ItemId;

    fn set(ids: &[u32]) -> Itemset {
        Itemset::new(ids.iter().map(|i| ItemId(*i)))
    }

    fn pair_table() -> SupportTable {
        let mut table = SupportTable::new();
        table.insert(set(&[0]), 10);
        table.insert(set(&[1]), 12);
        table.insert(set(&[0, 1]), 6);
        table
    }

    #[test]
    fn test_candidates_largest_first() {
        let mut table = pair_table();
        table.insert(set(&[2]), 9);
        table.insert(set(&[0, 2]), 5);
        table.insert(set(&[1, 2]), 1);
        table.insert(set(&[0, 1, 2]), 3);
        let generator = RuleGenerator::new(&table, 20).with_min_support(3);
        let sizes: Vec<usize> = generator.candidates().iter().map(|(s, _)| s.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
        assert_eq!(generator.candidates()[1].0, &set(&[0, 1]));
    }

    #[test]
    fn test_score_formula() {
        let table = pair_table();
        let generator = RuleGenerator::new(&table, 20);
        let rule = generator
            .score(&set(&[0]), &set(&[1]), 6)
            .unwrap()
            .unwrap();
        assert!((rule.confidence - 0.6).abs() < 1e-12);
        assert_eq!(rule.lift, 1.0);
        assert_eq!(rule.support, 6);
        assert!((rule.support_fraction(20) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_visited_pairs_are_skipped() {
        let table = pair_table();
        let generator = RuleGenerator::new(&table, 20);
        let mut visited = VisitedPairs::new();
        visited.insert((set(&[0]), set(&[1])));
        let rules = generator.generate_with(&mut visited).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].antecedent, set(&[1]));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_missing_subset_is_contract_violation() {
        let mut table = SupportTable::new();
        table.insert(set(&[0]), 4);
        table.insert(set(&[0, 1]), 2);
        let err = RuleGenerator::new(&table, 10).generate().unwrap_err();
        assert!(matches!(err, MiningError::ProviderContract { .. }));
    }

    #[test]
    fn test_zero_subset_support_is_contract_violation() {
        let mut table = pair_table();
        table.insert(set(&[1]), 0);
        let err = RuleGenerator::new(&table, 20).generate().unwrap_err();
        assert!(matches!(err, MiningError::ProviderContract { .. }));
    }

    #[test]
    fn test_display() {
        let mut vocab = Vocabulary::new();
        vocab.intern("p1|0|correct|nohint".to_string());
        vocab.intern("p2|0|wrong|hint".to_string());
        let rule = Rule {
            antecedent: set(&[0]),
            consequent: set(&[1]),
            support: 4,
            confidence: 0.8,
            lift: 1.3333,
        };
        assert_eq!(
            rule.display(&vocab, 10).to_string(),
            "[p1|0|correct|nohint] => [p2|0|wrong|hint] : sup(0.40), conf(0.80), lift(1.33)"
        );
    }
}
