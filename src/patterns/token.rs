// src/patterns/token.rs — Token model and dense item vocabulary

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::infra::errors::MiningError;
use crate::patterns::itemset::{Basket, Itemset, Sequence};

/// Anything that can stand for an atomic event. Mining never looks inside.
pub trait Token: Clone + Eq + Hash + Ord + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Debug> Token for T {}

/// Dense integer handle for a token inside one mining run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps tokens to dense `ItemId`s in first-seen order.
#[derive(Debug, Clone)]
pub struct Vocabulary<T> {
    tokens: Vec<T>,
    index: HashMap<T, ItemId>,
}

impl<T: Token> Default for Vocabulary<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> Vocabulary<T> {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Return the id for `token`, assigning the next free one if unseen.
    pub fn intern(&mut self, token: T) -> ItemId {
        if let Some(id) = self.index.get(&token) {
            return *id;
        }
        let id = ItemId(self.tokens.len() as u32);
        self.tokens.push(token.clone());
        self.index.insert(token, id);
        id
    }

    pub fn id(&self, token: &T) -> Option<ItemId> {
        self.index.get(token).copied()
    }

    pub fn token(&self, id: ItemId) -> Option<&T> {
        self.tokens.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Encode per-user event collections as baskets. Repeated tokens within
    /// one user collapse.
    pub fn encode_baskets<I, B>(&mut self, users: I) -> Vec<Basket>
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = T>,
    {
        users
            .into_iter()
            .map(|events| Itemset::new(events.into_iter().map(|t| self.intern(t))))
            .collect()
    }

    /// Encode per-user event collections as sequences, keeping order and repeats.
    pub fn encode_sequences<I, S>(&mut self, users: I) -> Vec<Sequence>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = T>,
    {
        users
            .into_iter()
            .map(|events| Sequence::new(events.into_iter().map(|t| self.intern(t))))
            .collect()
    }

    /// Tokens for `ids`, skipping ids this vocabulary never issued.
    pub fn decode<'a>(&'a self, ids: &[ItemId]) -> Vec<&'a T> {
        ids.iter().filter_map(|id| self.token(*id)).collect()
    }
}

/// One student interaction, as produced by the ingestion layer.
///
/// Textual form is `problem|attempt|correct-or-wrong|hint-or-nohint`, e.g.
/// `MT-ELM-DivdDivrQuot-u1-1-RM|0|correct|nohint`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventToken {
    pub problem: String,
    pub attempt: u32,
    pub correct: bool,
    pub hint: bool,
}

impl EventToken {
    pub fn new(problem: impl Into<String>, attempt: u32, correct: bool, hint: bool) -> Self {
        Self {
            problem: problem.into(),
            attempt,
            correct,
            hint,
        }
    }
}

impl fmt::Display for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.problem,
            self.attempt,
            if self.correct { "correct" } else { "wrong" },
            if self.hint { "hint" } else { "nohint" },
        )
    }
}

impl FromStr for EventToken {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MiningError::InvalidToken(s.to_string());

        // Problem ids may themselves contain '|', so split from the right
        let mut parts = s.rsplitn(4, '|');
        let hint = match parts.next() {
            Some("hint") => true,
            Some("nohint") => false,
            _ => return Err(invalid()),
        };
        let correct = match parts.next() {
            Some("correct") => true,
            Some("wrong") => false,
            _ => return Err(invalid()),
        };
        let attempt = parts
            .next()
            .and_then(|a| a.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let problem = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;

        Ok(Self::new(problem, attempt, correct, hint))
    }
}
