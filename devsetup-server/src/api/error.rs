//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use devsetup_installer::InstallError;

use crate::service::install_service::InstallServiceError;
use crate::service::tool_service::ToolError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    DatabaseError(sqlx::Error),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(id) => ApiError::NotFound(format!("Tool not found: {}", id)),
            ToolError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<InstallServiceError> for ApiError {
    fn from(err: InstallServiceError) -> Self {
        match err {
            InstallServiceError::NoToolsRequested => {
                ApiError::BadRequest("No tools specified".to_string())
            }
            InstallServiceError::ToolNotFound(id) => {
                ApiError::NotFound(format!("Tool not found: {}", id))
            }
            InstallServiceError::AlreadyInstalled(name) => {
                ApiError::BadRequest(format!("Tool already installed: {}", name))
            }
            InstallServiceError::ToolSetNotFound(name) => {
                ApiError::NotFound(format!("Tool set not found: {}", name))
            }
            InstallServiceError::NothingToInstall(name) => ApiError::BadRequest(format!(
                "All tools in {} are already installed",
                name
            )),
            InstallServiceError::BatchNotActive(id) => ApiError::NotFound(format!(
                "Installation {} not found or already completed",
                id
            )),
            InstallServiceError::Installer(err) => err.into(),
            InstallServiceError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<InstallError> for ApiError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            InstallError::NotFound(what) => ApiError::NotFound(format!("Installation not found: {}", what)),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_install_errors_map_to_status_codes() {
        assert_eq!(
            status_of(InstallServiceError::NoToolsRequested),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(InstallServiceError::ToolNotFound(3)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(InstallServiceError::AlreadyInstalled("Git".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(InstallServiceError::BatchNotActive(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(InstallError::NotFound("job".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(InstallError::InvalidArgument("empty".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_tool_errors_map_to_status_codes() {
        assert_eq!(status_of(ToolError::NotFound(1)), StatusCode::NOT_FOUND);
    }
}
