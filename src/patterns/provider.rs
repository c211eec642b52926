// src/patterns/provider.rs — Frequent pattern providers
//
// The engine never counts support itself. It asks a provider for every
// itemset (or sequence) that clears a count threshold, tagged with its raw
// support. Any enumerator that is deterministic and anti-monotone fits.

use std::collections::{HashMap, HashSet};

use crate::infra::errors::{MiningError, Result};
use crate::patterns::itemset::{Basket, Itemset, Sequence};
use crate::patterns::token::ItemId;

/// Frequent itemsets with their raw support counts.
pub type SupportTable = HashMap<Itemset, u64>;

/// Frequent sequences with their raw support counts.
pub type SequenceTable = HashMap<Sequence, u64>;

/// Enumerates frequent itemsets over baskets.
///
/// Contract: every non-empty subset of a reported itemset is reported too,
/// with support at least as high; identical input yields identical output.
pub trait ItemsetProvider {
    fn frequent_itemsets(&self, baskets: &[Basket], min_support: u64) -> Result<SupportTable>;
}

/// Enumerates frequent (gapped) subsequences over sequences.
///
/// Same contract as [`ItemsetProvider`], with "subset" read as
/// "subsequence".
pub trait SequenceProvider {
    fn frequent_sequences(&self, sequences: &[Sequence], min_support: u64)
        -> Result<SequenceTable>;
}

fn check_min_support(min_support: u64) -> Result<()> {
    if min_support == 0 {
        return Err(MiningError::InvalidThreshold {
            name: "min_support",
            value: 0.0,
            expected: "a count of at least 1",
        });
    }
    Ok(())
}

/// Level-wise itemset enumeration: join frequent (k-1)-sets sharing a prefix,
/// prune candidates with an infrequent subset, count the rest by scanning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelWise {
    max_len: Option<usize>,
}

impl LevelWise {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after itemsets of this size. Subsets are still complete.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    fn join(level: &[Itemset], frequent: &SupportTable) -> Vec<Itemset> {
        let mut candidates = Vec::new();
        for (i, a) in level.iter().enumerate() {
            let prefix = &a.items()[..a.len() - 1];
            for b in &level[i + 1..] {
                // `level` is sorted, so a shared prefix means adjacent runs
                if &b.items()[..b.len() - 1] != prefix {
                    break;
                }
                let candidate = a.union(b);
                let all_subsets_frequent = candidate
                    .iter()
                    .all(|item| frequent.contains_key(&candidate.without(item)));
                if all_subsets_frequent {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }
}

impl ItemsetProvider for LevelWise {
    fn frequent_itemsets(&self, baskets: &[Basket], min_support: u64) -> Result<SupportTable> {
        check_min_support(min_support)?;

        let mut singles: HashMap<ItemId, u64> = HashMap::new();
        for basket in baskets {
            for item in basket.iter() {
                *singles.entry(item).or_default() += 1;
            }
        }

        let mut table = SupportTable::new();
        let mut level: Vec<Itemset> = singles
            .into_iter()
            .filter(|(_, count)| *count >= min_support)
            .map(|(item, count)| {
                let set = Itemset::singleton(item);
                table.insert(set.clone(), count);
                set
            })
            .collect();
        level.sort();

        let mut size = 1;
        while !level.is_empty() && self.max_len.map_or(true, |max| size < max) {
            let mut next = Vec::new();
            for candidate in Self::join(&level, &table) {
                let count = baskets.iter().filter(|b| candidate.is_subset(b)).count() as u64;
                if count >= min_support {
                    table.insert(candidate.clone(), count);
                    next.push(candidate);
                }
            }
            next.sort();
            tracing::debug!("level {}: {} frequent itemsets", size + 1, next.len());
            level = next;
            size += 1;
        }

        Ok(table)
    }
}

/// Depth-first sequence growth over projected positions: each frequent
/// prefix keeps, per supporting sequence, the position right after its
/// leftmost match, and is extended by every frequent single item.
///
/// Growth runs on an explicit stack, so long sessions of repeated tokens
/// cost heap, not call depth. `with_max_len` bounds the work.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixGrowth {
    max_len: Option<usize>,
}

/// A frequent prefix and where each supporting sequence resumes after it.
type Projected = (Sequence, Vec<(usize, usize)>);

impl PrefixGrowth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after sequences of this length. Shorter ones are still complete.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    fn grow(
        &self,
        items: &[ItemId],
        sequences: &[Sequence],
        min_support: u64,
        table: &mut SequenceTable,
    ) {
        let everywhere: Vec<(usize, usize)> = (0..sequences.len()).map(|i| (i, 0)).collect();
        let mut stack: Vec<Projected> = vec![(Sequence::default(), everywhere)];
        while let Some((prefix, projection)) = stack.pop() {
            if self.max_len.is_some_and(|max| prefix.len() >= max) {
                continue;
            }
            for &item in items {
                let next: Vec<(usize, usize)> = projection
                    .iter()
                    .filter_map(|&(seq, pos)| {
                        sequences[seq].items()[pos..]
                            .iter()
                            .position(|i| *i == item)
                            .map(|offset| (seq, pos + offset + 1))
                    })
                    .collect();
                if (next.len() as u64) < min_support {
                    continue;
                }
                let extended = prefix.extended(item);
                table.insert(extended.clone(), next.len() as u64);
                stack.push((extended, next));
            }
        }
    }
}

impl SequenceProvider for PrefixGrowth {
    fn frequent_sequences(
        &self,
        sequences: &[Sequence],
        min_support: u64,
    ) -> Result<SequenceTable> {
        check_min_support(min_support)?;

        // Each sequence counts once per item however often the item repeats
        let mut singles: HashMap<ItemId, u64> = HashMap::new();
        for sequence in sequences {
            let distinct: HashSet<ItemId> = sequence.items().iter().copied().collect();
            for item in distinct {
                *singles.entry(item).or_default() += 1;
            }
        }
        let mut items: Vec<ItemId> = singles
            .into_iter()
            .filter(|(_, count)| *count >= min_support)
            .map(|(item, _)| item)
            .collect();
        items.sort();

        let mut table = SequenceTable::new();
        self.grow(&items, sequences, min_support, &mut table);
        tracing::debug!("{} frequent sequences", table.len());
        Ok(table)
    }
}
