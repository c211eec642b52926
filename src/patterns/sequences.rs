// src/patterns/sequences.rs — Significance filtering of frequent sequences
//
// A sequence's significance is its support divided by the largest product
// support({x}) * support(S \ {x}) over the items x it contains, i.e. lift
// against its strongest one-item split. Order is ignored while scoring and
// kept in the output.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::infra::errors::{MiningError, Result};
use crate::patterns::itemset::Sequence;
use crate::patterns::provider::SequenceTable;
use crate::patterns::token::{Token, Vocabulary};

/// A frequent sequence that cleared the significance floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePattern {
    pub sequence: Sequence,
    /// Fraction of all sequences containing this one.
    pub support: f64,
    pub significance: f64,
}

impl SequencePattern {
    pub fn display<'a, T>(&'a self, vocab: &'a Vocabulary<T>) -> SequenceDisplay<'a, T> {
        SequenceDisplay {
            pattern: self,
            vocab,
        }
    }
}

/// `[a, b, c] : sup(0.30), sig(1.50)`
pub struct SequenceDisplay<'a, T> {
    pattern: &'a SequencePattern,
    vocab: &'a Vocabulary<T>,
}

impl<T: Token + fmt::Display> fmt::Display for SequenceDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, token) in self
            .vocab
            .decode(self.pattern.sequence.items())
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{token}")?;
        }
        write!(
            f,
            "] : sup({:.2}), sig({:.2})",
            self.pattern.support, self.pattern.significance
        )
    }
}

/// Scores frequent sequences and keeps the significant ones.
#[derive(Debug, Clone, Copy)]
pub struct SequenceFilter<'a> {
    table: &'a SequenceTable,
    total: u64,
    min_lift: f64,
}

impl<'a> SequenceFilter<'a> {
    pub fn new(table: &'a SequenceTable, total: u64) -> Self {
        Self {
            table,
            total,
            min_lift: 0.0,
        }
    }

    /// Patterns with significance equal to the floor are dropped.
    pub fn with_min_lift(mut self, min_lift: f64) -> Self {
        self.min_lift = min_lift;
        self
    }

    /// Sequences of length two or more, in sequence order.
    fn candidates(&self) -> Vec<(&'a Sequence, u64)> {
        let mut candidates: Vec<(&'a Sequence, u64)> = self
            .table
            .iter()
            .filter(|(sequence, _)| sequence.len() >= 2)
            .map(|(sequence, count)| (sequence, *count))
            .collect();
        candidates.sort();
        candidates
    }

    pub fn filter(&self) -> Result<Vec<SequencePattern>> {
        let mut patterns = Vec::new();
        for (sequence, count) in self.candidates() {
            if let Some(pattern) = self.evaluate(sequence, count)? {
                patterns.push(pattern);
            }
        }
        Ok(patterns)
    }

    /// Same output as `filter`, one rayon task per sequence.
    pub fn filter_parallel(&self) -> Result<Vec<SequencePattern>> {
        let scored = self
            .candidates()
            .par_iter()
            .map(|(sequence, count)| self.evaluate(sequence, *count))
            .collect::<Result<Vec<Option<SequencePattern>>>>()?;
        Ok(scored.into_iter().flatten().collect())
    }

    fn evaluate(&self, sequence: &Sequence, count: u64) -> Result<Option<SequencePattern>> {
        let Some(significance) = self.significance(sequence, count)? else {
            return Ok(None);
        };
        if significance > self.min_lift {
            Ok(Some(SequencePattern {
                sequence: sequence.clone(),
                support: count as f64 / self.total as f64,
                significance,
            }))
        } else {
            Ok(None)
        }
    }

    /// Lift of `sequence` against its strongest one-item split, or `None`
    /// when it has fewer than two distinct items and so no split at all.
    ///
    /// The remainder S \ {x} is looked up as the sequence with every `x`
    /// removed; it is a subsequence of a frequent sequence and must be in the
    /// table.
    pub fn significance(&self, sequence: &Sequence, count: u64) -> Result<Option<f64>> {
        let items = sequence.token_set();
        if items.len() < 2 {
            return Ok(None);
        }

        // Work in counts: count(S) * N / max(count(x) * count(rest)) equals the
        // ratio of fractions and stays exact for small tables
        let mut max_split: u128 = 0;
        for item in items.iter() {
            let single = self.lookup(&Sequence::new([item]), count)?;
            let rest = self.lookup(&sequence.without(item), count)?;
            max_split = max_split.max(single as u128 * rest as u128);
        }
        Ok(Some((count as f64 * self.total as f64) / max_split as f64))
    }

    /// Support of a subsequence of a sequence with `superset_count` support.
    fn lookup(&self, sequence: &Sequence, superset_count: u64) -> Result<u64> {
        match self.table.get(sequence) {
            Some(0) => Err(MiningError::contract(sequence, "zero support")),
            Some(&count) if count < superset_count => Err(MiningError::contract(
                sequence,
                format!("support {count} below superset support {superset_count}"),
            )),
            Some(&count) => Ok(count),
            None => Err(MiningError::contract(sequence, "missing subsequence support")),
        }
    }
}
