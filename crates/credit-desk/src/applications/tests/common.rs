use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::applications::domain::{
    ApplicationId, ApplicationRequest, ApplicationStatus, Client, ClientId, CreditApplication,
    ScoringRule,
};
use crate::applications::evaluation::{RuleCatalog, ScoringConfig, ScoringEngine};
use crate::applications::memory::{InMemoryApplicationRepository, InMemoryClientRepository};
use crate::applications::repository::{
    ApplicationRepository, ClientRepository, RepositoryError, RuleRepository,
};
use crate::applications::CreditApplicationService;
use crate::clock::FixedClock;

pub(super) type MemoryService =
    CreditApplicationService<InMemoryApplicationRepository, InMemoryClientRepository, RuleCatalog>;

pub(super) const DOCUMENT: &str = "4510123456";

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
}

pub(super) fn decision_time() -> DateTime<Utc> {
    epoch() + Duration::hours(2)
}

pub(super) fn amount(value: i64) -> Decimal {
    Decimal::from(value)
}

pub(super) fn client() -> Client {
    Client {
        id: ClientId("client-000001".to_string()),
        document_number: DOCUMENT.to_string(),
        first_name: "Anna".to_string(),
        last_name: "Ivanova".to_string(),
        phone_number: Some("+79990001122".to_string()),
        email: None,
        created_at: epoch() - Duration::days(30),
    }
}

pub(super) fn application(
    suffix: &str,
    value: i64,
    created_at: DateTime<Utc>,
) -> CreditApplication {
    CreditApplication::new(
        ApplicationId(format!("app-{suffix}")),
        client().id,
        amount(value),
        created_at,
    )
}

pub(super) fn request(value: i64) -> ApplicationRequest {
    ApplicationRequest {
        document_number: DOCUMENT.to_string(),
        amount: amount(value),
    }
}

pub(super) fn rule(id: &str, condition: &str, points: i32) -> ScoringRule {
    ScoringRule::new(id, format!("rule {id}"), condition, points)
}

pub(super) fn engine(rules: Vec<ScoringRule>) -> ScoringEngine<RuleCatalog> {
    ScoringEngine::new(Arc::new(RuleCatalog::new(rules)), ScoringConfig::default())
}

pub(super) fn strict_engine(rules: Vec<ScoringRule>) -> ScoringEngine<RuleCatalog> {
    ScoringEngine::new(Arc::new(RuleCatalog::new(rules)), ScoringConfig::strict())
}

pub(super) fn build_service(
    rules: Vec<ScoringRule>,
) -> (
    MemoryService,
    Arc<InMemoryApplicationRepository>,
    Arc<RuleCatalog>,
) {
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let clients = Arc::new(InMemoryClientRepository::default());
    clients.insert(client()).expect("seed client");
    let catalog = Arc::new(RuleCatalog::new(rules));
    let service = CreditApplicationService::new(
        applications.clone(),
        clients,
        catalog.clone(),
        ScoringConfig::default(),
        Arc::new(FixedClock(epoch())),
    );
    (service, applications, catalog)
}

pub(super) struct UnavailableRules;

impl RuleRepository for UnavailableRules {
    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("rule database offline".to_string()))
    }

    fn find_by_name(&self, _fragment: &str) -> Result<Vec<ScoringRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("rule database offline".to_string()))
    }

    fn with_min_points(&self, _points: i32) -> Result<Vec<ScoringRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("rule database offline".to_string()))
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(
        &self,
        _application: CreditApplication,
    ) -> Result<CreditApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _application: CreditApplication,
    ) -> Result<CreditApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<CreditApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<CreditApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_status(
        &self,
        _status: ApplicationStatus,
    ) -> Result<Vec<CreditApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count_by_status(&self, _status: ApplicationStatus) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_client(&self, _client_id: &ClientId) -> Result<Vec<CreditApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_amount_range(
        &self,
        _min: Decimal,
        _max: Decimal,
    ) -> Result<Vec<CreditApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
