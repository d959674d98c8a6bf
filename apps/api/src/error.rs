//! HTTP error responses
//!
//! Every failure leaves the API as `{ "error": { "code", "message" } }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use skitrack_core::ContainerError;
use thiserror::Error;
use tracing::error;

use crate::models::ValidationError;
use crate::repositories::RepositoryError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("The requested resource was not found")]
    NotFound,

    #[error("{message}")]
    Conflict { message: String },

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Container(_) | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Container(_) => "COMPONENT_RESOLUTION_FAILED",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation {
            message: err.message,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(err) => err.into(),
            RepositoryError::Conflict { .. } => ApiError::Conflict {
                message: err.to_string(),
            },
            RepositoryError::UnsupportedStore { .. } | RepositoryError::Poisoned { .. } => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log.
        let message = if status.is_server_error() {
            error!(error = %self, code = self.error_code(), "request failed");
            "An unexpected condition was encountered".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ContainerError::unknown("TourController", None)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_by_kind() {
        let validation = RepositoryError::Validation(ValidationError::new("x", "'x' is not a valid property name."));
        assert!(matches!(ApiError::from(validation), ApiError::Validation { .. }));

        let conflict = RepositoryError::Conflict {
            field: "username".into(),
            value: "skier".into(),
        };
        assert_eq!(ApiError::from(conflict).status_code(), StatusCode::CONFLICT);

        let store = RepositoryError::UnsupportedStore {
            connection_string: "mongodb://x".into(),
        };
        assert_eq!(ApiError::from(store).error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_response() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
