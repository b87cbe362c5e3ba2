use serde::{Deserialize, Serialize};

/// Controls how the scoring engine treats the rule set it loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Reject rules whose condition text is outside the known vocabulary instead of scoring
    /// them as zero.
    #[serde(default)]
    pub strict_conditions: bool,
}

impl ScoringConfig {
    pub fn strict() -> Self {
        Self {
            strict_conditions: true,
        }
    }
}
