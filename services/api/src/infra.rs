use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use credit_desk::applications::{
    CreditApplicationService, InMemoryApplicationRepository, InMemoryClientRepository,
    RuleCatalog,
};
use credit_desk::clients::ClientDirectory;
use credit_desk::clock::Clock;
use credit_desk::config::ScoringSettings;
use credit_desk::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use tracing::info;

pub(crate) type ApplicationService =
    CreditApplicationService<InMemoryApplicationRepository, InMemoryClientRepository, RuleCatalog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Services shared by every request handler.
#[derive(Clone)]
pub(crate) struct Desk {
    pub(crate) applications: Arc<ApplicationService>,
    pub(crate) clients: Arc<ClientDirectory<InMemoryClientRepository>>,
    pub(crate) rules: Arc<RuleCatalog>,
}

impl Desk {
    pub(crate) fn new(
        catalog: RuleCatalog,
        settings: &ScoringSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let clients = Arc::new(InMemoryClientRepository::default());
        let rules = Arc::new(catalog);
        let applications = Arc::new(CreditApplicationService::new(
            Arc::new(InMemoryApplicationRepository::default()),
            clients.clone(),
            rules.clone(),
            settings.engine_config(),
            clock.clone(),
        ));

        Self {
            applications,
            clients: Arc::new(ClientDirectory::new(clients, clock)),
            rules,
        }
    }

    /// Build the desk with rules from `SCORING_RULES_PATH`, or the standard table when unset.
    pub(crate) fn from_settings(
        settings: &ScoringSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let catalog = load_catalog(settings)?;
        Ok(Self::new(catalog, settings, clock))
    }
}

pub(crate) fn load_catalog(settings: &ScoringSettings) -> Result<RuleCatalog, AppError> {
    match &settings.rules_path {
        Some(path) => {
            let catalog = RuleCatalog::from_path(path)?;
            info!(path = %path.display(), "scoring rules loaded from file");
            Ok(catalog)
        }
        None => Ok(RuleCatalog::standard()),
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))
}
