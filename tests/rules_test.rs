// tests/rules_test.rs — Integration test: association rule generation and reduction

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rulemine::infra::config::MiningConfig;
use rulemine::infra::errors::MiningError;
use rulemine::patterns::{
    maximal_rules, EventToken, ItemId, Itemset, ItemsetProvider, LevelWise, MinSupport,
    PatternMiner, Rule, RuleDominance, RuleGenerator, SearchStrategy, SupportTable, Vocabulary,
};

fn set(ids: &[u32]) -> Itemset {
    Itemset::new(ids.iter().map(|i| ItemId(*i)))
}

/// Every non-empty subset of {0..k}, support shrinking with size.
fn full_lattice(k: u32) -> SupportTable {
    let mut table = SupportTable::new();
    for mask in 1u32..(1 << k) {
        let subset: Itemset = (0..k).filter(|&i| mask & (1 << i) != 0).map(ItemId).collect();
        let support = (k as u64 - subset.len() as u64 + 1) * 10;
        table.insert(subset, support);
    }
    table
}

fn pair_table() -> SupportTable {
    let mut table = SupportTable::new();
    table.insert(set(&[0]), 10);
    table.insert(set(&[1]), 12);
    table.insert(set(&[0, 1]), 6);
    table
}

/// Ten baskets where {a, b} => {c} and {a} => {c} are both strong.
fn abc_baskets() -> (Vocabulary<String>, Vec<Itemset>) {
    let mut users: Vec<Vec<String>> = Vec::new();
    for _ in 0..3 {
        users.push(vec!["a".into(), "b".into(), "c".into()]);
    }
    users.push(vec!["a".into(), "c".into()]);
    for _ in 0..6 {
        users.push(vec!["d".into()]);
    }
    let mut vocab = Vocabulary::new();
    let baskets = vocab.encode_baskets(users);
    (vocab, baskets)
}

fn find<'a>(
    rules: &'a [Rule],
    vocab: &Vocabulary<String>,
    a: &[&str],
    c: &[&str],
) -> Option<&'a Rule> {
    let ids = |tokens: &[&str]| -> Itemset {
        tokens
            .iter()
            .map(|t| vocab.id(&t.to_string()).unwrap())
            .collect()
    };
    let (a, c) = (ids(a), ids(c));
    rules.iter().find(|r| r.antecedent == a && r.consequent == c)
}

#[test]
fn test_every_partition_exactly_once() {
    for k in 2..=6u32 {
        let table = full_lattice(k);
        let top: Itemset = (0..k).map(ItemId).collect();
        let rules = RuleGenerator::new(&table, 1000).generate().unwrap();

        let of_top: Vec<&Rule> = rules.iter().filter(|r| r.itemset() == top).collect();
        assert_eq!(of_top.len(), (1usize << k) - 2, "k = {k}");

        let distinct: HashSet<(Itemset, Itemset)> = rules
            .iter()
            .map(|r| (r.antecedent.clone(), r.consequent.clone()))
            .collect();
        assert_eq!(distinct.len(), rules.len(), "duplicate rules for k = {k}");

        // Summed over every sub-itemset of size >= 2: 3^k - 2^(k+1) + 1
        let expected = 3usize.pow(k) - (1usize << (k + 1)) + 1;
        assert_eq!(rules.len(), expected, "k = {k}");

        for rule in &rules {
            assert!(rule.antecedent.is_disjoint(&rule.consequent));
            assert!(!rule.antecedent.is_empty() && !rule.consequent.is_empty());
            assert!(rule.confidence > 0.0 && rule.confidence <= 1.0);
            assert!(rule.lift > 0.0);
        }
    }
}

#[test]
fn test_strategies_and_parallel_agree() {
    let table = full_lattice(5);
    let base = RuleGenerator::new(&table, 1000).with_min_lift(0.5);
    let recursive = base.generate().unwrap();
    let worklist = base
        .with_strategy(SearchStrategy::Worklist)
        .generate()
        .unwrap();
    let parallel = base.generate_parallel().unwrap();

    assert_eq!(recursive, worklist);
    assert_eq!(recursive, parallel);
}

#[test]
fn test_confidence_and_lift_formulas() {
    let table = pair_table();
    let rules = RuleGenerator::new(&table, 20).generate().unwrap();
    let a_to_b = rules
        .iter()
        .find(|r| r.antecedent == set(&[0]))
        .unwrap();
    assert!((a_to_b.confidence - 0.6).abs() < 1e-12);
    assert!((a_to_b.lift - 1.0).abs() < 1e-12);
    assert_eq!(a_to_b.support, 6);

    let b_to_a = rules
        .iter()
        .find(|r| r.antecedent == set(&[1]))
        .unwrap();
    assert!((b_to_a.confidence - 0.5).abs() < 1e-12);
}

#[test]
fn test_confidence_floor_is_inclusive() {
    let table = pair_table();
    let rules = RuleGenerator::new(&table, 20)
        .with_min_confidence(0.6)
        .generate()
        .unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].antecedent, set(&[0]));
}

#[test]
fn test_lift_floor_is_exclusive() {
    let table = pair_table();
    let at_floor = RuleGenerator::new(&table, 20)
        .with_min_lift(1.0)
        .generate()
        .unwrap();
    assert!(at_floor.is_empty());

    let below_floor = RuleGenerator::new(&table, 20)
        .with_min_lift(0.99)
        .generate()
        .unwrap();
    assert_eq!(below_floor.len(), 2);
}

#[test]
fn test_min_support_skips_weak_itemsets() {
    let table = pair_table();
    let rules = RuleGenerator::new(&table, 20)
        .with_min_support(7)
        .generate()
        .unwrap();
    assert!(rules.is_empty());
}

#[test]
fn test_more_specific_antecedent_wins() {
    let (vocab, baskets) = abc_baskets();
    let table = LevelWise::new().frequent_itemsets(&baskets, 1).unwrap();
    let rules = RuleGenerator::new(&table, baskets.len() as u64)
        .with_min_support(3)
        .with_min_confidence(0.5)
        .with_min_lift(1.0)
        .generate()
        .unwrap();

    let a_c = find(&rules, &vocab, &["a"], &["c"]).unwrap();
    assert!((a_c.lift - 2.5).abs() < 1e-12);
    assert!(find(&rules, &vocab, &["a", "b"], &["c"]).is_some());

    let maximal = maximal_rules(rules, RuleDominance::SameConsequent);
    assert!(find(&maximal, &vocab, &["a"], &["c"]).is_none());
    assert!(find(&maximal, &vocab, &["b"], &["c"]).is_none());
    assert!(find(&maximal, &vocab, &["a", "b"], &["c"]).is_some());
}

#[test]
fn test_maximal_rules_idempotent() {
    let table = full_lattice(4);
    let rules = RuleGenerator::new(&table, 1000).generate().unwrap();
    for dominance in [RuleDominance::SameConsequent, RuleDominance::StrictBoth] {
        let once = maximal_rules(rules.clone(), dominance);
        let twice = maximal_rules(once.clone(), dominance);
        assert_eq!(once, twice);
        assert!(once.len() < rules.len());
    }
}

#[test]
fn test_pipeline_end_to_end() {
    let (vocab, baskets) = abc_baskets();
    let config = MiningConfig {
        min_support: MinSupport::Fraction(0.3),
        min_confidence: 0.5,
        min_lift: 1.0,
        maximal: true,
        ..Default::default()
    };
    let miner = PatternMiner::new(config).unwrap();
    let rules = miner.mine_rules(&LevelWise::new(), &baskets).unwrap();

    assert!(find(&rules, &vocab, &["a", "b"], &["c"]).is_some());
    assert!(find(&rules, &vocab, &["a"], &["c"]).is_none());
    // Sorted by support, descending
    assert!(rules.windows(2).all(|w| w[0].support >= w[1].support));
    assert!(rules[0].display(&vocab, 10).to_string().contains(" => "));
}

#[test]
fn test_pipeline_is_deterministic() {
    let (_, baskets) = abc_baskets();
    let config = MiningConfig {
        min_support: MinSupport::Count(1),
        min_confidence: 0.1,
        min_lift: 0.0,
        ..Default::default()
    };
    let miner = PatternMiner::new(config).unwrap();
    let first = miner.mine_rules(&LevelWise::new(), &baskets).unwrap();
    let second = miner.mine_rules(&LevelWise::new(), &baskets).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_event_tokens_as_items() {
    let users = vec![
        vec![
            EventToken::new("P-1", 0, false, true),
            EventToken::new("P-1", 1, true, false),
        ],
        vec![
            EventToken::new("P-1", 0, false, true),
            EventToken::new("P-1", 1, true, false),
        ],
        vec![EventToken::new("P-2", 0, true, false)],
    ];
    let mut vocab = Vocabulary::new();
    let baskets = vocab.encode_baskets(users);
    let config = MiningConfig {
        min_support: MinSupport::Count(2),
        min_lift: 1.0,
        ..Default::default()
    };
    let rules = PatternMiner::new(config)
        .unwrap()
        .mine_rules(&LevelWise::new(), &baskets)
        .unwrap();
    assert_eq!(rules.len(), 2);
    let text = rules[0].display(&vocab, 3).to_string();
    assert!(text.contains("P-1|0|wrong|hint") && text.contains("P-1|1|correct|nohint"));
}

#[test]
fn test_invalid_thresholds_rejected_before_mining() {
    for config in [
        MiningConfig {
            min_support: MinSupport::Fraction(0.0),
            ..Default::default()
        },
        MiningConfig {
            min_confidence: 1.5,
            ..Default::default()
        },
        MiningConfig {
            min_lift: -1.0,
            ..Default::default()
        },
    ] {
        assert!(matches!(
            PatternMiner::new(config),
            Err(MiningError::InvalidThreshold { .. })
        ));
    }
}

#[test]
fn test_broken_provider_fails_loudly() {
    struct Forgetful;
    impl ItemsetProvider for Forgetful {
        fn frequent_itemsets(
            &self,
            _baskets: &[Itemset],
            _min_support: u64,
        ) -> rulemine::infra::errors::Result<SupportTable> {
            // Reports a pair without its singletons
            let mut table = SupportTable::new();
            table.insert(set(&[0, 1]), 2);
            Ok(table)
        }
    }

    let miner = PatternMiner::new(MiningConfig::default()).unwrap();
    let err = miner.mine_rules(&Forgetful, &[set(&[0, 1])]).unwrap_err();
    assert!(matches!(err, MiningError::ProviderContract { .. }));
}
