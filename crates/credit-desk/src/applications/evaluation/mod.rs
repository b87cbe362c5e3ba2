mod catalog;
mod config;
mod rules;

pub use catalog::{RuleCatalog, RuleImportError};
pub use config::ScoringConfig;
pub use rules::{prior_applications, CompiledRule, RuleCondition};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{ApplicationId, CreditApplication, RuleId};
use super::lifecycle::MAX_SCORE;
use super::repository::{RepositoryError, RuleRepository};

/// Folds the active rule set into a bounded score for one application.
pub struct ScoringEngine<R> {
    rules: Arc<R>,
    config: ScoringConfig,
}

impl<R> ScoringEngine<R>
where
    R: RuleRepository,
{
    pub fn new(rules: Arc<R>, config: ScoringConfig) -> Self {
        Self { rules, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Fetch and compile the active rules.
    ///
    /// In lenient mode an unrecognized condition compiles to a rule that always contributes
    /// zero; in strict mode it aborts the load.
    pub fn load_rules(&self) -> Result<Vec<CompiledRule>, ScoringError> {
        let active = self.rules.active_rules()?;
        let mut compiled = Vec::with_capacity(active.len());

        for rule in active.iter().filter(|rule| rule.active) {
            let candidate = CompiledRule::compile(rule);
            if !candidate.is_recognized() {
                if self.config.strict_conditions {
                    return Err(RuleLoadError::UnrecognizedCondition {
                        rule_id: rule.id.clone(),
                        condition: rule.condition.clone(),
                    }
                    .into());
                }
                warn!(
                    rule_id = %rule.id,
                    rule = %rule.name,
                    condition = %rule.condition,
                    "unrecognized rule condition; rule will score zero"
                );
            }
            compiled.push(candidate);
        }

        Ok(compiled)
    }

    /// Compute the clamped score for `application`.
    ///
    /// `history` is the owning client's applications; it may include `application` itself.
    pub fn compute_score(
        &self,
        application: &CreditApplication,
        history: &[CreditApplication],
    ) -> Result<ScoreCard, ScoringError> {
        let rules = self.load_rules()?;
        let (components, raw_total) = rules::score_application(&rules, application, history);
        let score = clamp_score(raw_total);

        info!(
            application_id = %application.id,
            rules = rules.len(),
            raw_total,
            score,
            "application scored"
        );

        Ok(ScoreCard {
            application_id: application.id.clone(),
            score,
            raw_total,
            components,
        })
    }
}

/// Clamp a signed rule total into `0..=100`.
pub fn clamp_score(total: i64) -> u8 {
    u8::try_from(total.clamp(0, i64::from(MAX_SCORE))).unwrap_or(MAX_SCORE)
}

/// Discrete contribution of a single rule, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub condition: Option<RuleCondition>,
    pub matched: bool,
    pub points: i32,
}

/// Scoring output: the clamped score, the raw sum and the per-rule trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub application_id: ApplicationId,
    pub score: u8,
    pub raw_total: i64,
    pub components: Vec<ScoreComponent>,
}

impl ScoreCard {
    pub fn matched(&self) -> impl Iterator<Item = &ScoreComponent> {
        self.components.iter().filter(|component| component.matched)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleLoadError {
    #[error("rule {rule_id} has an unrecognized condition: '{condition}'")]
    UnrecognizedCondition { rule_id: RuleId, condition: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("rule store failure: {0}")]
    Rules(#[from] RepositoryError),
    #[error(transparent)]
    RuleLoad(#[from] RuleLoadError),
}
