//! Clinical severity of an interaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered clinical risk level.
///
/// Declaration order is the clinical order, so the derived `Ord` gives
/// `Minor < Moderate < Major < Contraindicated`. Sorting and thresholding
/// both go through this single comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Limited clinical effect, usually no action needed
    Minor,
    /// May need monitoring or dose adjustment
    Moderate,
    /// Avoid the combination or monitor closely
    Major,
    /// Never co-administer
    Contraindicated,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 4] = [
        Severity::Minor,
        Severity::Moderate,
        Severity::Major,
        Severity::Contraindicated,
    ];

    /// Lowest severity counted as high risk.
    pub const HIGH_THRESHOLD: Severity = Severity::Major;

    /// Whether this severity counts towards the high-severity total.
    pub fn is_high(self) -> bool {
        self >= Self::HIGH_THRESHOLD
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Major => "Major",
            Severity::Contraindicated => "Contraindicated",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a severity string is not one of the four levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minor" => Ok(Severity::Minor),
            "moderate" => Ok(Severity::Moderate),
            "major" => Ok(Severity::Major),
            "contraindicated" => Ok(Severity::Contraindicated),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
