// src/patterns/thresholds.rs — Mining thresholds and boundary validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::infra::errors::{MiningError, Result};

/// Minimum support, either as a fraction of all transactions or as a raw count.
///
/// In TOML an integer reads as a count and a float as a fraction, so
/// `min_support = 3` and `min_support = 0.3` mean different things.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinSupport {
    Count(u64),
    Fraction(f64),
}

impl Default for MinSupport {
    fn default() -> Self {
        MinSupport::Fraction(0.3)
    }
}

impl MinSupport {
    /// Absolute count threshold for a universe of `total` transactions.
    ///
    /// A fraction is rounded up, so `count >= resolve(total)` is the same test
    /// as `count / total >= fraction`. Never returns zero.
    pub fn resolve(&self, total: u64) -> u64 {
        match *self {
            MinSupport::Count(c) => c.max(1),
            MinSupport::Fraction(f) => {
                // Absorb float noise such as 0.3 * 10 = 3.0000000000000004
                let raw = f * total as f64 - 1e-9;
                (raw.ceil() as u64).max(1)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            MinSupport::Count(0) => Err(MiningError::InvalidThreshold {
                name: "min_support",
                value: 0.0,
                expected: "a count of at least 1",
            }),
            MinSupport::Count(_) => Ok(()),
            MinSupport::Fraction(f) if f > 0.0 && f <= 1.0 => Ok(()),
            MinSupport::Fraction(f) => Err(MiningError::InvalidThreshold {
                name: "min_support",
                value: f,
                expected: "a fraction in (0, 1]",
            }),
        }
    }
}

impl fmt::Display for MinSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinSupport::Count(c) => write!(f, "{c}"),
            MinSupport::Fraction(x) => write!(f, "{x}"),
        }
    }
}

impl FromStr for MinSupport {
    type Err = MiningError;

    /// `"5"` is a count, `"0.05"` (anything with a '.' or exponent) a fraction.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = if s.contains(['.', 'e', 'E']) {
            s.parse::<f64>().ok().map(MinSupport::Fraction)
        } else {
            s.parse::<u64>().ok().map(MinSupport::Count)
        };
        parsed.ok_or_else(|| MiningError::Config(format!("invalid min_support '{s}'")))
    }
}

/// The three thresholds every run is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_support: MinSupport,
    pub min_confidence: f64,
    pub min_lift: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_support: MinSupport::default(),
            min_confidence: 0.5,
            min_lift: 1.2,
        }
    }
}

impl Thresholds {
    /// Reject malformed thresholds before any mining work begins.
    pub fn validate(&self) -> Result<()> {
        self.min_support.validate()?;

        // NaN fails both comparisons
        if !(self.min_confidence > 0.0 && self.min_confidence <= 1.0) {
            return Err(MiningError::InvalidThreshold {
                name: "min_confidence",
                value: self.min_confidence,
                expected: "a value in (0, 1]",
            });
        }
        if !(self.min_lift >= 0.0) || self.min_lift.is_infinite() {
            return Err(MiningError::InvalidThreshold {
                name: "min_lift",
                value: self.min_lift,
                expected: "a finite value >= 0",
            });
        }
        Ok(())
    }
}
