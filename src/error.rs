//! Crate-wide error type.
//!
//! Repository and session failures propagate unchanged through services; the
//! HTTP layer translates them into a status code and a JSON body through the
//! [`IntoResponse`] implementation below.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use tower_sessions::session_store;

/// Body returned to HTTP clients for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Errors produced by the entity store, the session layer and the services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// No identity is attached to the request or connection.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An identity is attached but its role lacks the required capability.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unknown column `{column}` on table `{table}`")]
    UnknownColumn { table: String, column: String },

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("session store error: {0}")]
    SessionStore(#[from] session_store::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the underlying database rejected a write on a unique constraint.
    fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Database(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        )
    }

    /// Error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        if self.is_unique_violation() {
            return "conflict";
        }
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::UnknownColumn { .. } => "unknown_column",
            Self::Database(_) => "database_error",
            Self::Session(_) => "session_error",
            Self::SessionStore(_) => "session_store_error",
            Self::PasswordHash(_) => "password_hash_error",
            Self::Config(_) => "config_error",
            Self::Unavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        if self.is_unique_violation() {
            return StatusCode::CONFLICT;
        }
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) | Self::UnknownColumn { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_)
            | Self::Session(_)
            | Self::SessionStore(_)
            | Self::PasswordHash(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        // Internal details stay in the logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            code: self.code().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
