use crate::cli::ServeArgs;
use crate::infra::{AppState, Desk};
use crate::routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_desk::clock::SystemClock;
use credit_desk::config::AppConfig;
use credit_desk::error::AppError;
use credit_desk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.rules.take() {
        config.scoring.rules_path = Some(path);
    }
    if args.strict_rules {
        config.scoring.strict_rules = true;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let desk = Desk::from_settings(&config.scoring, Arc::new(SystemClock))?;

    let app = routes::router(desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        strict_rules = config.scoring.strict_rules,
        "credit desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
