// src/cli/mod.rs — CLI definition (clap derive)

pub mod input;
pub mod mine;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::infra::errors::MiningError;
use crate::patterns::{MinSupport, RuleDominance, SearchStrategy, SortKey};

#[derive(Parser)]
#[command(
    name = "rulemine",
    about = "Mine association rules and significant sequences from event logs",
    version
)]
pub struct Cli {
    /// Config file path (defaults to ./rulemine.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (overrides the config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Association rules over per-user baskets
    Rules {
        #[command(flatten)]
        common: MineArgs,

        /// Minimum confidence, in (0, 1]
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Partition search order
        #[arg(long, value_enum)]
        search: Option<SearchStrategy>,

        /// Which rules count as redundant under --maximal
        #[arg(long, value_enum)]
        dominance: Option<RuleDominance>,
    },
    /// Significant sequential patterns over per-user sessions
    Sequences {
        #[command(flatten)]
        common: MineArgs,
    },
}

/// Options shared by both mining commands. Unset flags fall back to the config.
#[derive(Args, Clone, Debug)]
pub struct MineArgs {
    /// Transactions: a .json array of token arrays, or one user per line
    pub input: PathBuf,

    /// Minimum support: a fraction like 0.3 or a count like 12
    #[arg(short = 's', long)]
    pub min_support: Option<MinSupport>,

    /// Minimum lift (rules) or significance (sequences), exclusive
    #[arg(short = 'l', long)]
    pub min_lift: Option<f64>,

    /// Sort key, descending
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// Require structured `problem|attempt|correct|hint` event tokens
    #[arg(long)]
    pub events: bool,

    /// Keep only maximal results
    #[arg(long)]
    pub maximal: bool,

    /// Score on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Emit JSON instead of one line per result
    #[arg(long)]
    pub json: bool,
}

/// Process exit code for a failed run: 2 when the thresholds or input were
/// at fault, 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<MiningError>() {
        Some(e) if e.is_user_error() => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_user_errors() {
        let empty = anyhow::Error::from(MiningError::EmptyInput);
        assert_eq!(exit_code(&empty), 2);
        let token = anyhow::Error::from(MiningError::InvalidToken("x".into()));
        assert_eq!(exit_code(&token), 2);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let contract = anyhow::Error::from(MiningError::contract("<0, 1>", "zero support"));
        assert_eq!(exit_code(&contract), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn test_events_flag_parses() {
        let cli = Cli::try_parse_from(["rulemine", "sequences", "log.txt", "--events", "-s", "3"])
            .unwrap();
        match cli.command {
            Commands::Sequences { common } => {
                assert!(common.events);
                assert_eq!(common.min_support, Some(MinSupport::Count(3)));
            }
            _ => panic!("expected sequences"),
        }
    }
}
