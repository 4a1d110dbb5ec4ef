use serde::{Deserialize, Serialize};

use crate::models::{IndicatorSet, ValidationStatus};

/// N-level confidence tier, descending
///
/// N3C is the crypto fallback tier used when derivative data (funding,
/// open-interest change) is unavailable; it outranks N3 for review priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    N1,
    N2,
    N3,
    N3C,
}

impl Tier {
    /// Review priority (lower is more urgent); N3C sits between N2 and N3
    pub fn priority(&self) -> u8 {
        match self {
            Tier::N1 => 1,
            Tier::N2 => 2,
            Tier::N3C => 3,
            Tier::N3 => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::N1 => "N1",
            Tier::N2 => "N2",
            Tier::N3 => "N3",
            Tier::N3C => "N3C",
        }
    }
}

/// Classification confidence grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Everything the classifier looked at, kept so an assignment can be
/// reproduced and audited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Named rule conditions that fired
    pub conditions: Vec<String>,

    pub validation: ValidationStatus,

    /// Sources that contributed to the validated series
    pub sources: Vec<String>,

    /// Real derivative data was available (crypto)
    pub derivatives_present: bool,

    /// Indicator snapshot at classification time
    pub indicators: IndicatorSet,
}

/// Tier assignment for one asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,

    /// Section key: "eq" or "cr"
    pub asset_type: String,

    /// Assigned tier; None when no rule fired
    pub tier: Option<Tier>,

    /// Every tier whose conditions matched, in rule order
    pub matched: Vec<Tier>,

    pub confidence: Confidence,
    pub evidence: Evidence,
}

impl Signal {
    pub fn has_signal(&self) -> bool {
        self.tier.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Tier::N1.priority() < Tier::N2.priority());
        assert!(Tier::N2.priority() < Tier::N3C.priority());
        assert!(Tier::N3C.priority() < Tier::N3.priority());
    }

    #[test]
    fn test_tier_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Tier::N3C).unwrap(), "\"N3C\"");
        assert_eq!(
            serde_json::to_string(&Confidence::Medium).unwrap(),
            "\"medium\""
        );
    }
}
