//! Proficiency tiers and the cutoff schemes that map a percentage onto them.
//!
//! Two schemes exist because different assessment families grade on
//! different curves. Each family picks exactly one (see `catalog::AssessmentFamily`).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Novice => "Novice",
            Tier::Beginner => "Beginner",
            Tier::Intermediate => "Intermediate",
            Tier::Advanced => "Advanced",
            Tier::Expert => "Expert",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierScheme {
    /// ≥90 Expert, ≥80 Advanced, ≥70 Intermediate, ≥60 Beginner, else Novice.
    #[default]
    Standard,
    /// ≥80 Expert, ≥60 Advanced, ≥40 Intermediate, ≥20 Beginner, else Novice.
    Quintile,
}

impl TierScheme {
    /// Lower bounds (inclusive), highest tier first.
    pub fn cutoffs(self) -> [(u32, Tier); 4] {
        match self {
            TierScheme::Standard => [
                (90, Tier::Expert),
                (80, Tier::Advanced),
                (70, Tier::Intermediate),
                (60, Tier::Beginner),
            ],
            TierScheme::Quintile => [
                (80, Tier::Expert),
                (60, Tier::Advanced),
                (40, Tier::Intermediate),
                (20, Tier::Beginner),
            ],
        }
    }
}

/// Classifies a 0–100 score into a tier.
pub fn classify(score: u32, scheme: TierScheme) -> Tier {
    scheme
        .cutoffs()
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, tier)| *tier)
        .unwrap_or(Tier::Novice)
}
