use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::RepoError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Container already exists: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convenience type alias
pub type ApiResult<T> = Result<T, ApiError>;

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(ip) => ApiError::ContainerNotFound(ip),
            RepoError::AlreadyExists(ip) => ApiError::Conflict(ip),
            RepoError::Storage(detail) => ApiError::Internal(detail),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ContainerNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                // Log the full detail server-side but don't expose to client
                tracing::error!("Internal error: {}", detail);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_mapping() {
        assert_eq!(ApiError::from(RepoError::NotFound("x".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(RepoError::AlreadyExists("x".into())).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(RepoError::Storage("x".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let response = ApiError::Internal("db password wrong".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
