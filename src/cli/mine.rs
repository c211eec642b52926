// src/cli/mine.rs — `rules` and `sequences` commands

use crate::cli::input::{canonical_events, load_transactions};
use crate::cli::MineArgs;
use crate::infra::config::MiningConfig;
use crate::patterns::{
    LevelWise, PatternMiner, PrefixGrowth, Rule, RuleDominance, SearchStrategy, SequencePattern,
    Vocabulary,
};

/// Command-line flags win over the config file.
pub fn apply_overrides(config: &mut MiningConfig, args: &MineArgs) {
    if let Some(min_support) = args.min_support {
        config.min_support = min_support;
    }
    if let Some(min_lift) = args.min_lift {
        config.min_lift = min_lift;
    }
    if let Some(sort) = args.sort {
        config.sort = sort;
    }
    config.maximal |= args.maximal;
    config.parallel |= args.parallel;
}

/// Mine association rules from the baskets in `args.input` and print them.
pub fn run_rules(
    mut config: MiningConfig,
    args: &MineArgs,
    min_confidence: Option<f64>,
    search: Option<SearchStrategy>,
    dominance: Option<RuleDominance>,
) -> anyhow::Result<()> {
    apply_overrides(&mut config, args);
    if let Some(min_confidence) = min_confidence {
        config.min_confidence = min_confidence;
    }
    if let Some(search) = search {
        config.search = search;
    }
    if let Some(dominance) = dominance {
        config.rule_dominance = dominance;
    }
    let miner = PatternMiner::new(config)?;

    let users = load_users(args)?;
    let mut vocab = Vocabulary::new();
    let baskets = vocab.encode_baskets(users);
    tracing::info!("{} baskets, {} unique tokens", baskets.len(), vocab.len());

    let rules = miner.mine_rules(&LevelWise::new(), &baskets)?;
    let total = baskets.len() as u64;

    if args.json {
        let out: Vec<serde_json::Value> = rules
            .iter()
            .map(|rule| rule_json(rule, &vocab, total))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for rule in &rules {
            println!("{}", rule.display(&vocab, total));
        }
        eprintln!("{} rules", rules.len());
    }
    Ok(())
}

/// Mine significant sequences from the sessions in `args.input` and print them.
pub fn run_sequences(mut config: MiningConfig, args: &MineArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, args);
    let miner = PatternMiner::new(config)?;

    let users = load_users(args)?;
    let mut vocab = Vocabulary::new();
    let sequences = vocab.encode_sequences(users);
    tracing::info!(
        "{} sequences, {} unique tokens, longest {}",
        sequences.len(),
        vocab.len(),
        sequences.iter().map(|s| s.len()).max().unwrap_or(0)
    );

    let patterns = miner.mine_sequences(&PrefixGrowth::new(), &sequences)?;

    if args.json {
        let out: Vec<serde_json::Value> = patterns
            .iter()
            .map(|pattern| sequence_json(pattern, &vocab))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for pattern in &patterns {
            println!("{}", pattern.display(&vocab));
        }
        eprintln!("{} sequences", patterns.len());
    }
    Ok(())
}

fn load_users(args: &MineArgs) -> anyhow::Result<Vec<Vec<String>>> {
    let users = load_transactions(&args.input)?;
    if args.events {
        return Ok(canonical_events(users)?);
    }
    Ok(users)
}

fn rule_json(rule: &Rule, vocab: &Vocabulary<String>, total: u64) -> serde_json::Value {
    serde_json::json!({
        "antecedent": vocab.decode(rule.antecedent.items()),
        "consequent": vocab.decode(rule.consequent.items()),
        "support": rule.support_fraction(total),
        "count": rule.support,
        "confidence": rule.confidence,
        "lift": rule.lift,
    })
}

fn sequence_json(pattern: &SequencePattern, vocab: &Vocabulary<String>) -> serde_json::Value {
    serde_json::json!({
        "sequence": vocab.decode(pattern.sequence.items()),
        "support": pattern.support,
        "significance": pattern.significance,
    })
}
