use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    PolicyError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::PolicyError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<skylane_core::Error> for AppError {
    fn from(err: skylane_core::Error) -> Self {
        use skylane_core::Error;
        match err {
            Error::Validation(msg) => AppError::ValidationError(msg),
            Error::PolicyWindow { .. } => AppError::PolicyError(err.to_string()),
            Error::NotFound(what) => AppError::NotFoundError(what),
            Error::Conflict(msg) => AppError::ConflictError(msg),
            Error::State(inner) => AppError::InternalServerError(inner.to_string()),
            Error::Datastore(inner) => AppError::InternalServerError(inner.to_string()),
        }
    }
}

impl From<skylane_core::StoreError> for AppError {
    fn from(err: skylane_core::StoreError) -> Self {
        use skylane_core::StoreError;
        match err {
            StoreError::NotFound => AppError::NotFoundError("row not found".to_string()),
            StoreError::Conflict(msg) => AppError::ConflictError(msg),
            StoreError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<skylane_catalog::CatalogError> for AppError {
    fn from(err: skylane_catalog::CatalogError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
