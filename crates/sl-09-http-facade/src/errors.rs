//! Facade error types and their HTTP rendering.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sl_08_lab_ledger::LabError;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::{error, warn};

/// A request failure, rendered as `{"error": message}` with `status`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// `"{field} is required"`
    pub fn missing(field: &str) -> Self {
        Self::bad_request(format!("{field} is required"))
    }
}

impl From<LabError> for ApiError {
    fn from(err: LabError) -> Self {
        if err.is_not_found() {
            return Self::not_found(err.to_string());
        }
        if err.is_caller_error() {
            warn!(error = %err, "Rejected request");
            return Self::bad_request(err.to_string());
        }
        error!(error = %err, "Ledger operation failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Failures starting or running the listener.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("Invalid facade configuration: {0}")]
    Config(String),

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}
