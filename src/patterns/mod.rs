// src/patterns/mod.rs — Association rule and sequential pattern mining

pub mod itemset;
pub mod maximal;
pub mod miner;
pub mod provider;
pub mod rules;
pub mod sequences;
pub mod thresholds;
pub mod token;

pub use itemset::{Basket, Itemset, Sequence};
pub use maximal::{maximal_rules, maximal_sequences, RuleDominance};
pub use miner::{sort_rules, sort_sequences, PatternMiner, SortKey};
pub use provider::{
    ItemsetProvider, LevelWise, PrefixGrowth, SequenceProvider, SequenceTable, SupportTable,
};
pub use rules::{Rule, RuleGenerator, SearchStrategy, VisitedPairs};
pub use sequences::{SequenceFilter, SequencePattern};
pub use thresholds::{MinSupport, Thresholds};
pub use token::{EventToken, ItemId, Token, Vocabulary};
