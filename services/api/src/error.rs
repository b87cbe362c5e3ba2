use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use credit_desk::applications::{ApplicationServiceError, RepositoryError, UnknownStatus};
use credit_desk::clients::ClientError;
use serde_json::json;
use tracing::warn;

/// HTTP-facing error carrying the status code chosen for a core failure.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }
}

fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        Self {
            status: repository_status(&error),
            message: error.to_string(),
        }
    }
}

impl From<ApplicationServiceError> for ApiError {
    fn from(error: ApplicationServiceError) -> Self {
        let status = match &error {
            ApplicationServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationServiceError::Repository(inner) => repository_status(inner),
            ApplicationServiceError::Lifecycle(_) => StatusCode::CONFLICT,
            ApplicationServiceError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(error: ClientError) -> Self {
        let status = match &error {
            ClientError::DuplicateDocument(_) => StatusCode::CONFLICT,
            ClientError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ClientError::Repository(inner) => repository_status(inner),
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<UnknownStatus> for ApiError {
    fn from(error: UnknownStatus) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self.message, "request failed");
        }
        let body = Json(json!({ "error": self.message }));
        (status, body).into_response()
    }
}
