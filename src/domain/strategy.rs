//! Strategy classification result.

use serde::{Deserialize, Serialize};

/// Structural family of a position's legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Single,
    Vertical,
    IronCondor,
    Straddle,
    Strangle,
    Calendar,
    Diagonal,
    Unknown,
}

impl StrategyKind {
    /// True for recognised structures built from more than one contract.
    pub fn is_multi_leg(&self) -> bool {
        !matches!(self, StrategyKind::Single | StrategyKind::Unknown)
    }
}

/// Classifier output: the structural tag plus its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub kind: StrategyKind,
    pub label: String,
}

impl Strategy {
    pub fn new(kind: StrategyKind, label: impl Into<String>) -> Self {
        Strategy {
            kind,
            label: label.into(),
        }
    }

    pub fn unknown() -> Self {
        Strategy::new(StrategyKind::Unknown, "Custom")
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
