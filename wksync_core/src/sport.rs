//! Sport tags and the execution activities they map to.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sports a workout document may declare
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SportType {
    StrengthTraining,
    Running,
    Cycling,
    Swimming,
    Other,
}

/// Activity category understood by the execution platform
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    TraditionalStrengthTraining,
    Running,
    Cycling,
    Swimming,
    Other,
}

/// Raw document tags, matched exactly
static SPORT_TAGS: Lazy<HashMap<&'static str, SportType>> = Lazy::new(|| {
    SportType::ALL
        .iter()
        .map(|sport| (sport.tag(), *sport))
        .collect()
});

impl SportType {
    pub const ALL: [SportType; 5] = [
        SportType::StrengthTraining,
        SportType::Running,
        SportType::Cycling,
        SportType::Swimming,
        SportType::Other,
    ];

    /// Look up a document tag; `None` when the tag is not a known sport
    pub fn from_tag(tag: &str) -> Option<Self> {
        SPORT_TAGS.get(tag).copied()
    }

    /// The tag this sport is written as in a workout document
    pub fn tag(self) -> &'static str {
        match self {
            SportType::StrengthTraining => "strengthTraining",
            SportType::Running => "running",
            SportType::Cycling => "cycling",
            SportType::Swimming => "swimming",
            SportType::Other => "other",
        }
    }

    pub fn activity(self) -> Activity {
        match self {
            SportType::StrengthTraining => Activity::TraditionalStrengthTraining,
            SportType::Running => Activity::Running,
            SportType::Cycling => Activity::Cycling,
            SportType::Swimming => Activity::Swimming,
            SportType::Other => Activity::Other,
        }
    }

    /// Whether distance goals make sense for this sport
    pub fn supports_distance_goals(self) -> bool {
        match self {
            SportType::Running | SportType::Cycling | SportType::Swimming => true,
            SportType::StrengthTraining | SportType::Other => false,
        }
    }
}
