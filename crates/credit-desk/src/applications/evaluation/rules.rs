use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{CreditApplication, RuleId, ScoringRule};
use super::ScoreComponent;

const LOWER_BRACKET: i64 = 100_000;
const UPPER_BRACKET: i64 = 500_000;

/// Closed set of conditions a scoring rule can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    /// amount > 500000
    AmountAbove,
    /// 100000 < amount <= 500000
    AmountBetween,
    /// amount <= 100000
    AmountBelow,
    /// no earlier application by the same client
    FirstCredit,
    /// at least one earlier application by the same client
    RepeatCredit,
}

// Grouped by condition in precedence order. The Cyrillic entries are the phrases stored by the
// legacy rule table.
const PHRASES: &[(&str, RuleCondition)] = &[
    ("amount > 500000", RuleCondition::AmountAbove),
    ("сумма заявки > 500000", RuleCondition::AmountAbove),
    ("amount between 100000 and 500000", RuleCondition::AmountBetween),
    ("сумма заявки между 100000 и 500000", RuleCondition::AmountBetween),
    ("amount < 100000", RuleCondition::AmountBelow),
    ("сумма заявки < 100000", RuleCondition::AmountBelow),
    ("first credit", RuleCondition::FirstCredit),
    ("первый кредит", RuleCondition::FirstCredit),
    ("second or later credit", RuleCondition::RepeatCredit),
    ("второй и более кредит", RuleCondition::RepeatCredit),
];

impl RuleCondition {
    /// Every condition named in the text, case-insensitively, in precedence order.
    pub fn parse_all(text: &str) -> Vec<Self> {
        let lowered = text.to_lowercase();
        let mut found: Vec<Self> = PHRASES
            .iter()
            .filter(|(phrase, _)| lowered.contains(phrase))
            .map(|(_, condition)| *condition)
            .collect();
        found.dedup();
        found
    }

    /// The highest-precedence condition named in the text.
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_all(text).into_iter().next()
    }

    pub const fn is_amount(self) -> bool {
        matches!(
            self,
            RuleCondition::AmountAbove | RuleCondition::AmountBetween | RuleCondition::AmountBelow
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            RuleCondition::AmountAbove => "amount > 500000",
            RuleCondition::AmountBetween => "amount between 100000 and 500000",
            RuleCondition::AmountBelow => "amount < 100000",
            RuleCondition::FirstCredit => "first credit",
            RuleCondition::RepeatCredit => "second or later credit",
        }
    }

    pub fn matches(self, application: &CreditApplication, history: &[CreditApplication]) -> bool {
        let lower = Decimal::from(LOWER_BRACKET);
        let upper = Decimal::from(UPPER_BRACKET);
        let amount = application.amount;

        match self {
            RuleCondition::AmountAbove => amount > upper,
            RuleCondition::AmountBetween => amount > lower && amount <= upper,
            RuleCondition::AmountBelow => amount <= lower,
            RuleCondition::FirstCredit => prior_applications(application, history) == 0,
            RuleCondition::RepeatCredit => prior_applications(application, history) > 0,
        }
    }
}

/// Count applications in `history` created strictly before `application`.
///
/// Equal timestamps do not count, so two applications created at the same instant are both
/// treated as the client's first.
pub fn prior_applications(application: &CreditApplication, history: &[CreditApplication]) -> usize {
    history
        .iter()
        .filter(|other| other.client_id == application.client_id)
        .filter(|other| other.created_at < application.created_at)
        .count()
}

/// A rule whose condition text has been parsed. `conditions` is empty for unrecognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub id: RuleId,
    pub name: String,
    pub conditions: Vec<RuleCondition>,
    pub points: i32,
}

impl CompiledRule {
    pub fn compile(rule: &ScoringRule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            conditions: RuleCondition::parse_all(&rule.condition),
            points: rule.points,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Walk the conditions in precedence order. An amount condition settles the rule only when
    /// it holds; the first credit-history condition settles it either way.
    fn decide(
        &self,
        application: &CreditApplication,
        history: &[CreditApplication],
    ) -> Option<(RuleCondition, bool)> {
        for &condition in &self.conditions {
            let holds = condition.matches(application, history);
            if holds || !condition.is_amount() {
                return Some((condition, holds));
            }
        }
        None
    }

    /// Points this rule contributes to `application`; zero when it does not match.
    pub fn evaluate(
        &self,
        application: &CreditApplication,
        history: &[CreditApplication],
    ) -> ScoreComponent {
        let (condition, matched) = match self.decide(application, history) {
            Some((condition, matched)) => (Some(condition), matched),
            None => (self.conditions.first().copied(), false),
        };

        ScoreComponent {
            rule_id: self.id.clone(),
            rule_name: self.name.clone(),
            condition,
            matched,
            points: if matched { self.points } else { 0 },
        }
    }
}

pub(crate) fn score_application(
    rules: &[CompiledRule],
    application: &CreditApplication,
    history: &[CreditApplication],
) -> (Vec<ScoreComponent>, i64) {
    let mut components = Vec::with_capacity(rules.len());
    let mut total: i64 = 0;

    for rule in rules {
        let component = rule.evaluate(application, history);
        tracing::debug!(
            application_id = %application.id,
            rule = %component.rule_name,
            matched = component.matched,
            points = component.points,
            "scoring rule applied"
        );
        total += i64::from(component.points);
        components.push(component);
    }

    (components, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vocabulary_case_insensitively() {
        assert_eq!(
            RuleCondition::parse("Amount > 500000 gives a bonus"),
            Some(RuleCondition::AmountAbove)
        );
        assert_eq!(
            RuleCondition::parse("AMOUNT BETWEEN 100000 AND 500000"),
            Some(RuleCondition::AmountBetween)
        );
        assert_eq!(
            RuleCondition::parse("Client's First Credit"),
            Some(RuleCondition::FirstCredit)
        );
        assert_eq!(
            RuleCondition::parse("second or later credit"),
            Some(RuleCondition::RepeatCredit)
        );
        assert_eq!(RuleCondition::parse("income > 2x payment"), None);
    }

    #[test]
    fn parses_legacy_phrases() {
        assert_eq!(
            RuleCondition::parse("Сумма заявки < 100000"),
            Some(RuleCondition::AmountBelow)
        );
        assert_eq!(
            RuleCondition::parse("Второй и более кредит"),
            Some(RuleCondition::RepeatCredit)
        );
    }

    #[test]
    fn collects_every_named_condition_in_precedence_order() {
        assert_eq!(
            RuleCondition::parse_all("first credit or amount < 100000 (первый кредит)"),
            vec![RuleCondition::AmountBelow, RuleCondition::FirstCredit]
        );
        assert_eq!(
            RuleCondition::parse("first credit or amount < 100000"),
            Some(RuleCondition::AmountBelow)
        );
        assert!(RuleCondition::parse_all("income > 2x payment").is_empty());
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for condition in [
            RuleCondition::AmountAbove,
            RuleCondition::AmountBetween,
            RuleCondition::AmountBelow,
            RuleCondition::FirstCredit,
            RuleCondition::RepeatCredit,
        ] {
            assert_eq!(RuleCondition::parse(condition.label()), Some(condition));
        }
    }
}
