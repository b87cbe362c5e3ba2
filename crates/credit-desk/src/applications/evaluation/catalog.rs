use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Deserializer};

use super::super::domain::{RuleId, ScoringRule};
use super::super::repository::{RepositoryError, RuleRepository};

/// In-memory rule store.
///
/// The rule set is held as an immutable snapshot that `replace` swaps whole, so a scoring run
/// that fetched its rules keeps a consistent view while the catalogue is reloaded.
#[derive(Debug, Default)]
pub struct RuleCatalog {
    snapshot: RwLock<Arc<Vec<ScoringRule>>>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<ScoringRule>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(rules)),
        }
    }

    /// Default rule table: amount brackets plus first/repeat credit adjustments.
    pub fn standard() -> Self {
        Self::new(vec![
            ScoringRule::new("rule-1", "Small loan", "Amount < 100000", 40),
            ScoringRule::new(
                "rule-2",
                "Medium loan",
                "Amount between 100000 and 500000",
                30,
            ),
            ScoringRule::new("rule-3", "Large loan", "Amount > 500000", 10),
            ScoringRule::new("rule-4", "New borrower", "First credit", 20),
            ScoringRule::new("rule-5", "Returning borrower", "Second or later credit", 30),
        ])
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load `id,name,condition,points[,active]` rows.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RuleImportError> {
        Ok(Self::new(parse_rules(reader)?))
    }

    pub fn snapshot(&self) -> Result<Arc<Vec<ScoringRule>>, RepositoryError> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| RepositoryError::Unavailable("rule catalog lock poisoned".to_string()))
    }

    /// Swap in a new rule set. Returns the number of rules now held.
    pub fn replace(&self, rules: Vec<ScoringRule>) -> Result<usize, RepositoryError> {
        let count = rules.len();
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| RepositoryError::Unavailable("rule catalog lock poisoned".to_string()))?;
        *guard = Arc::new(rules);
        tracing::info!(rules = count, "scoring rule catalog replaced");
        Ok(count)
    }

    /// Toggle a rule without deleting it.
    pub fn set_active(&self, rule_id: &RuleId, active: bool) -> Result<(), RepositoryError> {
        let mut rules = self.snapshot()?.as_ref().clone();
        let rule = rules
            .iter_mut()
            .find(|rule| &rule.id == rule_id)
            .ok_or(RepositoryError::NotFound)?;
        rule.active = active;
        self.replace(rules)?;
        Ok(())
    }
}

impl RuleRepository for RuleCatalog {
    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|rule| rule.active)
            .cloned()
            .collect())
    }

    fn find_by_name(&self, fragment: &str) -> Result<Vec<ScoringRule>, RepositoryError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .snapshot()?
            .iter()
            .filter(|rule| rule.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn with_min_points(&self, points: i32) -> Result<Vec<ScoringRule>, RepositoryError> {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|rule| rule.points >= points)
            .cloned()
            .collect())
    }
}

#[derive(Debug)]
pub enum RuleImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RuleImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleImportError::Io(err) => write!(f, "failed to read rule file: {}", err),
            RuleImportError::Csv(err) => write!(f, "invalid rule CSV data: {}", err),
        }
    }
}

impl std::error::Error for RuleImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuleImportError::Io(err) => Some(err),
            RuleImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RuleImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RuleImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    id: String,
    name: String,
    condition: String,
    points: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
}

impl RuleRow {
    fn into_rule(self) -> ScoringRule {
        let active = match self.active.as_deref().map(str::to_ascii_lowercase) {
            Some(flag) => !matches!(flag.as_str(), "false" | "no" | "0" | "off"),
            None => true,
        };

        ScoringRule {
            id: RuleId(self.id),
            name: self.name,
            condition: self.condition,
            points: self.points,
            active,
        }
    }
}

fn parse_rules<R: Read>(reader: R) -> Result<Vec<ScoringRule>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rules = Vec::new();

    for row in csv_reader.deserialize::<RuleRow>() {
        rules.push(row?.into_rule());
    }

    Ok(rules)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RULES_CSV: &str = "id,name,condition,points,active\n\
        r1,Large loan,Amount > 500000,30,true\n\
        r2,New borrower,First credit,20,\n\
        r3,Legacy,Сумма заявки < 100000,-15,false\n";

    #[test]
    fn imports_rules_from_csv() {
        let catalog =
            RuleCatalog::from_csv_reader(Cursor::new(RULES_CSV)).expect("csv parses");
        let all = catalog.snapshot().expect("snapshot");

        assert_eq!(all.len(), 3);
        assert_eq!(all[0].points, 30);
        assert!(all[1].active, "blank flag defaults to active");
        assert!(!all[2].active);
        assert_eq!(all[2].points, -15);
    }

    #[test]
    fn active_rules_exclude_disabled_entries() {
        let catalog =
            RuleCatalog::from_csv_reader(Cursor::new(RULES_CSV)).expect("csv parses");
        let active = catalog.active_rules().expect("active rules");
        let ids: Vec<_> = active.iter().map(|rule| rule.id.0.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn rejects_rows_with_invalid_points() {
        let csv = "id,name,condition,points\nr1,Broken,first credit,lots\n";
        match RuleCatalog::from_csv_reader(Cursor::new(csv)) {
            Err(RuleImportError::Csv(_)) => {}
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn replace_keeps_earlier_snapshots_intact() {
        let catalog = RuleCatalog::standard();
        let before = catalog.snapshot().expect("snapshot");

        catalog
            .replace(vec![ScoringRule::new("x", "Only", "first credit", 5)])
            .expect("replace");

        assert_eq!(before.len(), 5);
        assert_eq!(catalog.snapshot().expect("snapshot").len(), 1);
    }

    #[test]
    fn set_active_toggles_without_removing() {
        let catalog = RuleCatalog::standard();
        catalog
            .set_active(&RuleId("rule-3".to_string()), false)
            .expect("toggle");

        assert_eq!(catalog.active_rules().expect("active").len(), 4);
        assert_eq!(catalog.snapshot().expect("snapshot").len(), 5);

        match catalog.set_active(&RuleId("missing".to_string()), true) {
            Err(RepositoryError::NotFound) => {}
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn lookups_by_name_and_points() {
        let catalog = RuleCatalog::standard();
        let loans = catalog.find_by_name("LOAN").expect("by name");
        assert_eq!(loans.len(), 3);

        let generous = catalog.with_min_points(30).expect("by points");
        assert!(generous.iter().all(|rule| rule.points >= 30));
        assert_eq!(generous.len(), 3);
    }
}
