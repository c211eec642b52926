// src/main.rs — rulemine entry point

use clap::Parser;

use rulemine::cli::{Cli, Commands};
use rulemine::infra::config::Config;
use rulemine::infra::logger;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(rulemine::cli::exit_code(&e));
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no rulemine.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level));

    match &cli.command {
        Commands::Rules {
            common,
            min_confidence,
            search,
            dominance,
        } => rulemine::cli::mine::run_rules(
            config.mining,
            common,
            *min_confidence,
            *search,
            *dominance,
        ),
        Commands::Sequences { common } => rulemine::cli::mine::run_sequences(config.mining, common),
    }
}
