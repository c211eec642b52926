// src/patterns/maximal.rs — Reduce rules and sequences to maximal elements

use serde::{Deserialize, Serialize};

use crate::patterns::itemset::Itemset;
use crate::patterns::rules::Rule;
use crate::patterns::sequences::SequencePattern;

/// When one rule makes another redundant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RuleDominance {
    /// `R` is dropped for `R'` when `R'` has a strictly larger antecedent and
    /// the same consequent: {a} => {c} gives way to {a, b} => {c}.
    #[default]
    SameConsequent,
    /// `R` is dropped for `R'` only when both the antecedent and the
    /// consequent of `R` are strict subsets of those of `R'`.
    StrictBoth,
}

impl RuleDominance {
    /// True if `specific` makes `general` redundant.
    pub fn dominates(&self, specific: &Rule, general: &Rule) -> bool {
        match self {
            RuleDominance::SameConsequent => {
                general.consequent == specific.consequent
                    && general.antecedent.is_strict_subset(&specific.antecedent)
            }
            RuleDominance::StrictBoth => {
                general.antecedent.is_strict_subset(&specific.antecedent)
                    && general.consequent.is_strict_subset(&specific.consequent)
            }
        }
    }
}

/// Keep the rules no other rule dominates, in their original order.
pub fn maximal_rules(rules: Vec<Rule>, dominance: RuleDominance) -> Vec<Rule> {
    let keep: Vec<bool> = rules
        .iter()
        .map(|rule| !rules.iter().any(|other| dominance.dominates(other, rule)))
        .collect();
    retain_flagged(rules, &keep)
}

/// Keep the patterns whose token set is not strictly inside another
/// pattern's token set, in their original order.
///
/// Comparison is on token sets, so `<a, b>` and `<b, a>` count as the same
/// content and neither removes the other. `<a, b>` is still removed by
/// `<b, c, a>`, whatever the order.
pub fn maximal_sequences(patterns: Vec<SequencePattern>) -> Vec<SequencePattern> {
    let sets: Vec<Itemset> = patterns.iter().map(|p| p.sequence.token_set()).collect();
    let keep: Vec<bool> = sets
        .iter()
        .map(|set| !sets.iter().any(|other| set.is_strict_subset(other)))
        .collect();
    retain_flagged(patterns, &keep)
}

fn retain_flagged<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}
