use rust_decimal::Decimal;

use super::domain::{
    ApplicationId, ApplicationStatus, Client, ClientId, CreditApplication, ScoringRule,
};

/// Application store. `update` must keep the identifier and any timestamps already set.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError>;
    fn update(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<CreditApplication>, RepositoryError>;
    fn all(&self) -> Result<Vec<CreditApplication>, RepositoryError>;
    fn by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<CreditApplication>, RepositoryError>;
    fn count_by_status(&self, status: ApplicationStatus) -> Result<u64, RepositoryError>;
    fn by_client(&self, client_id: &ClientId) -> Result<Vec<CreditApplication>, RepositoryError>;
    /// Applications whose amount falls in `min..=max`.
    fn by_amount_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<CreditApplication>, RepositoryError>;
}

/// Client store. Document numbers are unique across clients.
pub trait ClientRepository: Send + Sync {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError>;
    fn update(&self, client: Client) -> Result<Client, RepositoryError>;
    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError>;
    fn find_by_document(&self, document_number: &str) -> Result<Option<Client>, RepositoryError>;
    fn exists_by_document(&self, document_number: &str) -> Result<bool, RepositoryError>;
    /// Case-insensitive match against first or last name.
    fn search_by_name(&self, fragment: &str) -> Result<Vec<Client>, RepositoryError>;
}

/// Rule store. `active_rules` must exclude inactive rules.
pub trait RuleRepository: Send + Sync {
    fn active_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError>;
    fn find_by_name(&self, fragment: &str) -> Result<Vec<ScoringRule>, RepositoryError>;
    fn with_min_points(&self, points: i32) -> Result<Vec<ScoringRule>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
