use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for credit applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for borrowers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

/// Identifier wrapper for scoring rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Borrower identity. Applications reference the client by id; the client never holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn masked_document(&self) -> String {
        mask_document(&self.document_number)
    }
}

/// Lifecycle states for a credit application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    Scoring,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::New,
        ApplicationStatus::Scoring,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Scoring => "scoring",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "scoring" => Ok(Self::Scoring),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

/// A single credit request. Status, score and decision time only change through
/// [`crate::applications::lifecycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditApplication {
    pub id: ApplicationId,
    pub client_id: ClientId,
    pub amount: Decimal,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub score: Option<u8>,
}

impl CreditApplication {
    pub fn new(
        id: ApplicationId,
        client_id: ClientId,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_id,
            amount,
            status: ApplicationStatus::New,
            created_at,
            decided_at: None,
            score: None,
        }
    }

    pub fn decision_rationale(&self) -> String {
        match (self.status, self.score) {
            (ApplicationStatus::Approved, Some(score)) => format!("approved with score {score}"),
            (ApplicationStatus::Rejected, Some(score)) => format!("rejected with score {score}"),
            (ApplicationStatus::Approved | ApplicationStatus::Rejected, None) => {
                "status set manually".to_string()
            }
            (ApplicationStatus::Scoring, _) => "scoring in progress".to_string(),
            (ApplicationStatus::New, _) => "pending evaluation".to_string(),
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            client_id: self.client_id.clone(),
            status: self.status.label(),
            amount: self.amount,
            score: self.score,
            decision_rationale: self.decision_rationale(),
            created_at: self.created_at,
            decided_at: self.decided_at,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub client_id: ClientId,
    pub status: &'static str,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub decision_rationale: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// A named, independently togglable scoring predicate as stored by the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub id: RuleId,
    pub name: String,
    pub condition: String,
    pub points: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ScoringRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: impl Into<String>,
        points: i32,
    ) -> Self {
        Self {
            id: RuleId(id.into()),
            name: name.into(),
            condition: condition.into(),
            points,
            active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Inbound request to open a credit application for an existing client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub document_number: String,
    pub amount: Decimal,
}

impl fmt::Debug for ApplicationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationRequest")
            .field("document_number", &mask_document(&self.document_number))
            .field("amount", &self.amount)
            .finish()
    }
}

/// Keeps the first four characters of a document number for log output.
pub fn mask_document(document: &str) -> String {
    if document.chars().count() < 4 {
        return "****".to_string();
    }
    let prefix: String = document.chars().take(4).collect();
    format!("{prefix}******")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_document_numbers() {
        assert_eq!(mask_document("4510123456"), "4510******");
        assert_eq!(mask_document("45"), "****");
        assert_eq!(mask_document(""), "****");
    }

    #[test]
    fn request_debug_hides_document() {
        let request = ApplicationRequest {
            document_number: "4510123456".to_string(),
            amount: Decimal::from(250_000),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("4510******"));
        assert!(!rendered.contains("123456"));
    }

    #[test]
    fn status_parses_labels_case_insensitively() {
        assert_eq!(
            "APPROVED".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Approved)
        );
        assert_eq!(
            " scoring ".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Scoring)
        );
        assert!("pending".parse::<ApplicationStatus>().is_err());
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(!ApplicationStatus::Scoring.is_terminal());
    }

    #[test]
    fn status_view_omits_missing_decision_fields() {
        use chrono::TimeZone;

        let created_at = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let application = CreditApplication::new(
            ApplicationId("app-000001".to_string()),
            ClientId("client-000001".to_string()),
            Decimal::from(550_000),
            created_at,
        );

        let value = serde_json::to_value(application.status_view()).expect("serializes");

        assert_eq!(value["status"], "new");
        assert_eq!(value["decision_rationale"], "pending evaluation");
        assert!(value.get("score").is_none());
        assert!(value.get("decided_at").is_none());
    }
}
