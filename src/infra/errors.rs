// src/infra/errors.rs — Error types for rulemine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MiningError {
    // Boundary errors (raised before any mining work)
    #[error("Invalid threshold {name} = {value}: expected {expected}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("No transactions to mine")]
    EmptyInput,

    #[error("Invalid token '{0}'")]
    InvalidToken(String),

    // A frequent pattern provider broke anti-monotonicity or reported zero support
    #[error("Frequent pattern provider contract violated for {pattern}: {reason}")]
    ProviderContract { pattern: String, reason: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MiningError>;

impl MiningError {
    pub fn contract(pattern: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        MiningError::ProviderContract {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's thresholds or input, as opposed
    /// to a misbehaving provider or the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MiningError::InvalidThreshold { .. }
                | MiningError::EmptyInput
                | MiningError::InvalidToken(_)
                | MiningError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_message() {
        let err = MiningError::InvalidThreshold {
            name: "min_confidence",
            value: 1.5,
            expected: "a value in (0, 1]",
        };
        assert_eq!(
            err.to_string(),
            "Invalid threshold min_confidence = 1.5: expected a value in (0, 1]"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_contract_is_not_user_error() {
        let err = MiningError::contract("{1, 2}", "missing subset support");
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("{1, 2}"));
    }
}
