// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::Result;
use crate::patterns::maximal::RuleDominance;
use crate::patterns::miner::SortKey;
use crate::patterns::rules::SearchStrategy;
use crate::patterns::thresholds::{MinSupport, Thresholds};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mining: MiningConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    pub min_support: MinSupport,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub search: SearchStrategy,
    /// Score itemsets and sequences on the rayon pool.
    pub parallel: bool,
    /// Reduce results to their maximal elements before sorting.
    pub maximal: bool,
    pub rule_dominance: RuleDominance,
    pub sort: SortKey,
}

impl Default for MiningConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            min_support: thresholds.min_support,
            min_confidence: thresholds.min_confidence,
            min_lift: thresholds.min_lift,
            search: SearchStrategy::default(),
            parallel: false,
            maximal: false,
            rule_dominance: RuleDominance::default(),
            sort: SortKey::default(),
        }
    }
}

impl MiningConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            min_lift: self.min_lift,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

/// Picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "rulemine.toml";

impl Config {
    /// Load `rulemine.toml` from the working directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
