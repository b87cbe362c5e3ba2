use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use credit_desk::applications::{
    ApplicationId, ApplicationRequest, ApplicationStatistics, ApplicationStatus,
    ApplicationStatusView, ClientId, RuleCondition, RuleId, RuleRepository, ScoreCard,
    ScoringRule, Transition,
};
use credit_desk::clients::{ClientView, ContactUpdate, NewClient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::infra::{AppState, Desk};

pub(crate) fn router(desk: Desk) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/clients", post(register_client).get(search_clients))
        .route(
            "/api/v1/clients/:client_id",
            get(client_endpoint).patch(update_client),
        )
        .route(
            "/api/v1/applications",
            post(submit_application).get(list_applications),
        )
        .route("/api/v1/applications/statistics", get(statistics_endpoint))
        .route("/api/v1/applications/:application_id", get(application_endpoint))
        .route(
            "/api/v1/applications/:application_id/scoring",
            post(scoring_endpoint),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(status_override_endpoint),
        )
        .route("/api/v1/rules", get(list_rules))
        .route("/api/v1/rules/:rule_id/active", post(toggle_rule))
        .with_state(desk)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClientSearch {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

pub(crate) async fn register_client(
    State(desk): State<Desk>,
    Json(payload): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError> {
    let client = desk.clients.register(payload)?;
    Ok((StatusCode::CREATED, Json(ClientView::from(&client))))
}

pub(crate) async fn search_clients(
    State(desk): State<Desk>,
    Query(search): Query<ClientSearch>,
) -> Result<Json<Vec<ClientView>>, ApiError> {
    let clients = desk.clients.search(search.name.as_deref().unwrap_or(""))?;
    Ok(Json(clients.iter().map(ClientView::from).collect()))
}

pub(crate) async fn client_endpoint(
    State(desk): State<Desk>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientView>, ApiError> {
    let client = desk.clients.get(&ClientId(client_id))?;
    Ok(Json(ClientView::from(&client)))
}

pub(crate) async fn update_client(
    State(desk): State<Desk>,
    Path(client_id): Path<String>,
    Json(update): Json<ContactUpdate>,
) -> Result<Json<ClientView>, ApiError> {
    let client = desk.clients.update_contact(&ClientId(client_id), update)?;
    Ok(Json(ClientView::from(&client)))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationFilter {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) min_amount: Option<Decimal>,
    #[serde(default)]
    pub(crate) max_amount: Option<Decimal>,
}

pub(crate) async fn submit_application(
    State(desk): State<Desk>,
    Json(request): Json<ApplicationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let application = desk.applications.submit(request)?;
    Ok((StatusCode::CREATED, Json(application.status_view())))
}

pub(crate) async fn list_applications(
    State(desk): State<Desk>,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationStatusView>>, ApiError> {
    let ApplicationFilter {
        status,
        min_amount,
        max_amount,
    } = filter;
    let amount_filtered = min_amount.is_some() || max_amount.is_some();
    let min = min_amount.unwrap_or(Decimal::MIN);
    let max = max_amount.unwrap_or(Decimal::MAX);

    let applications = match status {
        Some(raw) => {
            let status: ApplicationStatus = raw.parse()?;
            let mut matches = desk.applications.by_status(status)?;
            matches.retain(|application| application.amount >= min && application.amount <= max);
            matches
        }
        None if amount_filtered => desk.applications.by_amount_range(min, max)?,
        None => desk.applications.list()?,
    };

    Ok(Json(
        applications
            .iter()
            .map(|application| application.status_view())
            .collect(),
    ))
}

pub(crate) async fn application_endpoint(
    State(desk): State<Desk>,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationStatusView>, ApiError> {
    let application = desk.applications.get(&ApplicationId(application_id))?;
    Ok(Json(application.status_view()))
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoringResponse {
    pub(crate) application: ApplicationStatusView,
    pub(crate) score_card: ScoreCard,
    pub(crate) transition: Transition,
}

pub(crate) async fn scoring_endpoint(
    State(desk): State<Desk>,
    Path(application_id): Path<String>,
) -> Result<Json<ScoringResponse>, ApiError> {
    let run = desk.applications.run_scoring(&ApplicationId(application_id))?;
    Ok(Json(ScoringResponse {
        application: run.application.status_view(),
        score_card: run.score_card,
        transition: run.transition,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusOverride {
    pub(crate) status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusOverrideResponse {
    pub(crate) application: ApplicationStatusView,
    pub(crate) transition: Transition,
}

pub(crate) async fn status_override_endpoint(
    State(desk): State<Desk>,
    Path(application_id): Path<String>,
    Json(payload): Json<StatusOverride>,
) -> Result<Json<StatusOverrideResponse>, ApiError> {
    let (application, transition) = desk
        .applications
        .update_status(&ApplicationId(application_id), payload.status)?;
    Ok(Json(StatusOverrideResponse {
        application: application.status_view(),
        transition,
    }))
}

pub(crate) async fn statistics_endpoint(
    State(desk): State<Desk>,
) -> Result<Json<ApplicationStatistics>, ApiError> {
    Ok(Json(desk.applications.statistics()?))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RuleFilter {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) min_points: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RuleView {
    pub(crate) id: RuleId,
    pub(crate) name: String,
    pub(crate) condition: String,
    pub(crate) conditions: Vec<RuleCondition>,
    pub(crate) points: i32,
    pub(crate) active: bool,
}

impl From<ScoringRule> for RuleView {
    fn from(rule: ScoringRule) -> Self {
        Self {
            conditions: RuleCondition::parse_all(&rule.condition),
            id: rule.id,
            name: rule.name,
            condition: rule.condition,
            points: rule.points,
            active: rule.active,
        }
    }
}

pub(crate) async fn list_rules(
    State(desk): State<Desk>,
    Query(filter): Query<RuleFilter>,
) -> Result<Json<Vec<RuleView>>, ApiError> {
    let rules = desk.rules.find_by_name(filter.name.as_deref().unwrap_or(""))?;
    let min_points = filter.min_points.unwrap_or(i32::MIN);

    Ok(Json(
        rules
            .into_iter()
            .filter(|rule| rule.points >= min_points)
            .map(RuleView::from)
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleToggle {
    pub(crate) active: bool,
}

pub(crate) async fn toggle_rule(
    State(desk): State<Desk>,
    Path(rule_id): Path<String>,
    Json(toggle): Json<RuleToggle>,
) -> Result<StatusCode, ApiError> {
    desk.rules.set_active(&RuleId(rule_id), toggle.active)?;
    Ok(StatusCode::NO_CONTENT)
}
