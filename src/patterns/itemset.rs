// src/patterns/itemset.rs — Itemsets, baskets and sequences over item ids

use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::ItemId;

/// A set of items, kept sorted and free of duplicates so that equal sets
/// hash and compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itemset(Vec<ItemId>);

/// One user's unordered transaction.
pub type Basket = Itemset;

impl Itemset {
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Self {
        let mut items: Vec<ItemId> = items.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        Self(items)
    }

    pub fn singleton(item: ItemId) -> Self {
        Self(vec![item])
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.0.binary_search(&item).is_ok()
    }

    /// Copy of this set with `item` added.
    pub fn with(&self, item: ItemId) -> Self {
        match self.0.binary_search(&item) {
            Ok(_) => self.clone(),
            Err(pos) => {
                let mut items = self.0.clone();
                items.insert(pos, item);
                Self(items)
            }
        }
    }

    /// Copy of this set with `item` removed.
    pub fn without(&self, item: ItemId) -> Self {
        Self(self.0.iter().copied().filter(|i| *i != item).collect())
    }

    pub fn union(&self, other: &Itemset) -> Self {
        Self::new(self.iter().chain(other.iter()))
    }

    pub fn is_disjoint(&self, other: &Itemset) -> bool {
        !self.iter().any(|i| other.contains(i))
    }

    /// Sorted merge walk; both sides are sorted.
    pub fn is_subset(&self, other: &Itemset) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let mut theirs = other.0.iter();
        'outer: for mine in &self.0 {
            for candidate in theirs.by_ref() {
                if candidate == mine {
                    continue 'outer;
                }
                if candidate > mine {
                    return false;
                }
            }
            return false;
        }
        true
    }

    pub fn is_strict_subset(&self, other: &Itemset) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }
}

impl fmt::Display for Itemset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<ItemId> for Itemset {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// One user's chronological session. Repeats are meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(Vec<ItemId>);

impl Sequence {
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self(items.into_iter().collect())
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The distinct items of this sequence, order dropped.
    pub fn token_set(&self) -> Itemset {
        Itemset::new(self.0.iter().copied())
    }

    /// This sequence with every occurrence of `item` removed, order kept.
    pub fn without(&self, item: ItemId) -> Sequence {
        Sequence(self.0.iter().copied().filter(|i| *i != item).collect())
    }

    /// Copy of this sequence with `item` appended.
    pub fn extended(&self, item: ItemId) -> Sequence {
        let mut items = self.0.clone();
        items.push(item);
        Sequence(items)
    }

    /// True if `pattern` occurs in order, gaps allowed.
    pub fn contains_subsequence(&self, pattern: &[ItemId]) -> bool {
        let mut rest = self.0.iter();
        pattern
            .iter()
            .all(|wanted| rest.by_ref().any(|item| item == wanted))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str(">")
    }
}
