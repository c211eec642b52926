// src/patterns/miner.rs — Mining pipeline: provider -> scoring -> reduction -> ordering

use serde::{Deserialize, Serialize};

use crate::infra::config::MiningConfig;
use crate::infra::errors::{MiningError, Result};
use crate::patterns::itemset::{Basket, Sequence};
use crate::patterns::maximal::{maximal_rules, maximal_sequences};
use crate::patterns::provider::{ItemsetProvider, SequenceProvider};
use crate::patterns::rules::{Rule, RuleGenerator};
use crate::patterns::sequences::{SequenceFilter, SequencePattern};

/// Result ordering, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Support,
    Confidence,
    /// Lift for rules, significance for sequences.
    Lift,
}

/// Sort rules by `key`, highest first. Stable for equal keys.
pub fn sort_rules(rules: &mut [Rule], key: SortKey) {
    match key {
        SortKey::Support => rules.sort_by(|a, b| b.support.cmp(&a.support)),
        SortKey::Confidence => rules.sort_by(|a, b| b.confidence.total_cmp(&a.confidence)),
        SortKey::Lift => rules.sort_by(|a, b| b.lift.total_cmp(&a.lift)),
    }
}

/// Sort sequence patterns by `key`, highest first. Sequences have no
/// confidence, so `Confidence` orders by significance like `Lift`.
pub fn sort_sequences(patterns: &mut [SequencePattern], key: SortKey) {
    match key {
        SortKey::Support => patterns.sort_by(|a, b| b.support.total_cmp(&a.support)),
        SortKey::Confidence | SortKey::Lift => {
            patterns.sort_by(|a, b| b.significance.total_cmp(&a.significance))
        }
    }
}

/// Runs one mining pass end to end with validated settings.
#[derive(Debug, Clone)]
pub struct PatternMiner {
    config: MiningConfig,
}

impl PatternMiner {
    /// Validates thresholds up front; no mining work happens on bad input.
    pub fn new(config: MiningConfig) -> Result<Self> {
        config.thresholds().validate()?;
        Ok(Self { config })
    }

    /// Association rules over `baskets`, reduced and ordered per the config.
    pub fn mine_rules<P>(&self, provider: &P, baskets: &[Basket]) -> Result<Vec<Rule>>
    where
        P: ItemsetProvider + ?Sized,
    {
        let total = baskets.len() as u64;
        if total == 0 {
            return Err(MiningError::EmptyInput);
        }
        let min_support = self.config.min_support.resolve(total);
        tracing::info!("mining rules over {total} baskets (min support {min_support})");

        let table = provider.frequent_itemsets(baskets, min_support)?;
        tracing::info!("found {} frequent itemsets", table.len());

        let generator = RuleGenerator::new(&table, total)
            .with_min_support(min_support)
            .with_min_confidence(self.config.min_confidence)
            .with_min_lift(self.config.min_lift)
            .with_strategy(self.config.search);
        let mut rules = if self.config.parallel {
            generator.generate_parallel()?
        } else {
            generator.generate()?
        };
        tracing::info!("found {} rules with sufficient confidence and lift", rules.len());

        if self.config.maximal {
            rules = maximal_rules(rules, self.config.rule_dominance);
            tracing::debug!("{} maximal rules", rules.len());
        }
        sort_rules(&mut rules, self.config.sort);
        Ok(rules)
    }

    /// Significant sequential patterns over `sequences`, reduced and ordered
    /// per the config. `min_confidence` plays no part here.
    pub fn mine_sequences<P>(
        &self,
        provider: &P,
        sequences: &[Sequence],
    ) -> Result<Vec<SequencePattern>>
    where
        P: SequenceProvider + ?Sized,
    {
        let total = sequences.len() as u64;
        if total == 0 {
            return Err(MiningError::EmptyInput);
        }
        let min_support = self.config.min_support.resolve(total);
        tracing::info!("mining sequences over {total} sessions (min support {min_support})");

        let table = provider.frequent_sequences(sequences, min_support)?;
        tracing::info!("found {} frequent sequences", table.len());

        let filter = SequenceFilter::new(&table, total).with_min_lift(self.config.min_lift);
        let mut patterns = if self.config.parallel {
            filter.filter_parallel()?
        } else {
            filter.filter()?
        };
        tracing::info!("found {} sequences with sufficient gain", patterns.len());

        if self.config.maximal {
            patterns = maximal_sequences(patterns);
            tracing::debug!("{} maximal sequences", patterns.len());
        }
        sort_sequences(&mut patterns, self.config.sort);
        Ok(patterns)
    }
}
