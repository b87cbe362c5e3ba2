//! Credit application intake, scoring, and approval lifecycle.

pub mod domain;
pub mod evaluation;
pub mod intake;
pub mod lifecycle;
pub mod memory;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRequest, ApplicationStatus, ApplicationStatusView, Client,
    ClientId, CreditApplication, RuleId, ScoringRule, UnknownStatus,
};
pub use evaluation::{
    RuleCatalog, RuleCondition, RuleImportError, RuleLoadError, ScoreCard, ScoreComponent,
    ScoringConfig, ScoringEngine, ScoringError,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use lifecycle::{LifecycleError, Transition, APPROVAL_THRESHOLD};
pub use memory::{InMemoryApplicationRepository, InMemoryClientRepository};
pub use repository::{ApplicationRepository, ClientRepository, RepositoryError, RuleRepository};
pub use service::{
    ApplicationServiceError, ApplicationStatistics, CreditApplicationService, ScoringRun,
};
