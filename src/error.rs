use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("{path} is not a valid task file: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("failed to encode tasks: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("invalid task id: {0}")]
    MalformedId(String),
    #[error("task {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiError { code: code.to_string(), message: message.into(), errors: None },
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<TaskError> for ApiErrorResponse {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(errors) => {
                let mut resp =
                    Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Validation failed");
                resp.error.errors = Some(errors);
                resp
            }
            TaskError::MalformedId(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_ID", "Invalid task ID format")
            }
            TaskError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Task not found"),
            TaskError::Storage(e) => {
                log::error!("storage failure: {}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Error accessing task storage",
                )
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiErrorResponse {
    fn from(err: tokio::task::JoinError) -> Self {
        log::error!("task service call did not complete: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "An internal error occurred")
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_JSON", rejection.body_text())
    }
}
