// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types.
//!
//! `AppError` is what the backend handlers return and converts into a JSON
//! response. The remaining enums belong to the data-access side:
//! `RemoteError` classifies what went wrong talking to the API,
//! `StoreError` covers local storage, and `DataError` is what the
//! `DataManager` hands back to its callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// JSON error response body.
///
/// Every non-2xx response from the backend carries this shape, and the
/// remote client parses it back out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

// ─── Data-access errors ──────────────────────────────────────

/// Failure talking to the council API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// The request never got a response (DNS, refused connection, timeout).
    #[error("API unreachable: {0}")]
    Connectivity(String),

    /// The API answered with a non-2xx status.
    #[error("API error {status}: {error}")]
    Application {
        status: u16,
        error: String,
        details: Option<String>,
    },

    /// The API answered 2xx but the body did not match the expected shape.
    #[error("Malformed API response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RemoteError::Connectivity(_))
    }

    /// HTTP status for application errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Local storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt JSON under {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Error returned by `DataManager` operations.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The API answered with an error, or with garbage. Never a
    /// connectivity failure: those are absorbed by the local fallback.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A local write did not persist.
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("{collection} {id} not found")]
    NotFound { collection: &'static str, id: String },

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl DataError {
    /// True for a missing record, whether the remote or local store said so.
    pub fn is_not_found(&self) -> bool {
        match self {
            DataError::NotFound { .. } => true,
            DataError::Remote(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for DataError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DataError::Validation(errors.to_string())
    }
}
