use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::domain::{
    mask_document, ApplicationId, ApplicationRequest, ApplicationStatus, ClientId,
    CreditApplication,
};
use super::evaluation::{ScoreCard, ScoringConfig, ScoringEngine, ScoringError};
use super::intake::{IntakeGuard, IntakeViolation};
use super::lifecycle::{self, LifecycleError, Transition};
use super::repository::{
    ApplicationRepository, ClientRepository, RepositoryError, RuleRepository,
};
use crate::clock::Clock;

/// Service composing the intake guard, the stores, the scoring engine and the lifecycle.
pub struct CreditApplicationService<A, C, R> {
    guard: IntakeGuard,
    applications: Arc<A>,
    clients: Arc<C>,
    engine: ScoringEngine<R>,
    clock: Arc<dyn Clock>,
    sequence: AtomicU64,
}

impl<A, C, R> CreditApplicationService<A, C, R>
where
    A: ApplicationRepository + 'static,
    C: ClientRepository + 'static,
    R: RuleRepository + 'static,
{
    pub fn new(
        applications: Arc<A>,
        clients: Arc<C>,
        rules: Arc<R>,
        config: ScoringConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard: IntakeGuard,
            applications,
            clients,
            engine: ScoringEngine::new(rules, config),
            clock,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_application_id(&self) -> ApplicationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ApplicationId(format!("app-{id:06}"))
    }

    /// Open a new application for the client holding `request.document_number`.
    pub fn submit(
        &self,
        request: ApplicationRequest,
    ) -> Result<CreditApplication, ApplicationServiceError> {
        let request = self.guard.validate(request)?;
        let client = self
            .clients
            .find_by_document(&request.document_number)?
            .ok_or(RepositoryError::NotFound)?;

        let application = CreditApplication::new(
            self.next_application_id(),
            client.id.clone(),
            request.amount,
            self.clock.now(),
        );
        let stored = self.applications.insert(application)?;

        info!(
            application_id = %stored.id,
            client_id = %client.id,
            document = %mask_document(&request.document_number),
            amount = %stored.amount,
            "credit application created"
        );
        Ok(stored)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<CreditApplication, ApplicationServiceError> {
        let application = self
            .applications
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn list(&self) -> Result<Vec<CreditApplication>, ApplicationServiceError> {
        Ok(self.applications.all()?)
    }

    pub fn by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<CreditApplication>, ApplicationServiceError> {
        Ok(self.applications.by_status(status)?)
    }

    pub fn client_applications(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<CreditApplication>, ApplicationServiceError> {
        Ok(self.applications.by_client(client_id)?)
    }

    pub fn by_amount_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<CreditApplication>, ApplicationServiceError> {
        Ok(self.applications.by_amount_range(min, max)?)
    }

    /// Score an application and persist the resulting decision.
    ///
    /// Assumes at most one scoring run per application is in flight.
    pub fn run_scoring(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ScoringRun, ApplicationServiceError> {
        let mut application = self.get(application_id)?;

        lifecycle::begin_scoring(&mut application)?;
        let mut application = self.applications.update(application)?;

        let history = self.applications.by_client(&application.client_id)?;
        let score_card = self.engine.compute_score(&application, &history)?;

        let transition = lifecycle::apply_score(
            &mut application,
            i64::from(score_card.score),
            self.clock.now(),
        )?;
        let application = self.applications.update(application)?;

        info!(
            application_id = %application.id,
            score = score_card.score,
            status = %application.status,
            "scoring decision recorded"
        );

        Ok(ScoringRun {
            application,
            score_card,
            transition,
        })
    }

    /// Administrative status override; does not run scoring or touch the score.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(CreditApplication, Transition), ApplicationServiceError> {
        let mut application = self.get(application_id)?;
        let transition = lifecycle::set_status(&mut application, status, self.clock.now());
        let application = self.applications.update(application)?;

        info!(
            application_id = %application.id,
            from = %transition.from,
            to = %transition.to,
            "application status overridden"
        );
        Ok((application, transition))
    }

    pub fn statistics(&self) -> Result<ApplicationStatistics, ApplicationServiceError> {
        Ok(ApplicationStatistics {
            total: self.applications.all()?.len() as u64,
            new: self.applications.count_by_status(ApplicationStatus::New)?,
            scoring: self.applications.count_by_status(ApplicationStatus::Scoring)?,
            approved: self.applications.count_by_status(ApplicationStatus::Approved)?,
            rejected: self.applications.count_by_status(ApplicationStatus::Rejected)?,
        })
    }
}

/// Outcome of [`CreditApplicationService::run_scoring`].
#[derive(Debug, Clone, Serialize)]
pub struct ScoringRun {
    pub application: CreditApplication,
    pub score_card: ScoreCard,
    pub transition: Transition,
}

/// Application counts per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStatistics {
    pub total: u64,
    pub new: u64,
    pub scoring: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl ApplicationStatistics {
    pub fn summary(&self) -> String {
        format!(
            "Applications: {}\nNew: {}\nScoring: {}\nApproved: {}\nRejected: {}",
            self.total, self.new, self.scoring, self.approved, self.rejected
        )
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
