//! Unified error types and result handling.
//!
//! Every fallible function in the crate returns [`Result`]. Domain errors map
//! onto HTTP status codes at the surface layer via the [`IntoResponse`] impl,
//! so handlers can use `?` freely without translating errors by hand.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (bad settings file, missing value)
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Request payload failed validation
    #[error("{message}")]
    Validation {
        /// Human-readable description of the failed validation
        message: String,
    },

    /// No user with the given identifier
    #[error("User not found: {user}")]
    UserNotFound {
        /// Username or numeric id that failed to resolve
        user: String,
    },

    /// No fund with the given id, or it is invisible to this caller
    #[error("Fund not found: {id}")]
    FundNotFound {
        /// Fund id that failed to resolve
        id: i64,
    },

    /// No month with the given id
    #[error("Month not found: {id}")]
    MonthNotFound {
        /// Month id that failed to resolve
        id: i64,
    },

    /// No payment row with the given id
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// Payment id that failed to resolve
        id: i64,
    },

    /// Caller is not logged in, or the session token is expired
    #[error("Not authenticated")]
    Unauthorized,

    /// Caller is logged in but the access rules deny the operation
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Which rule denied the operation
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (socket bind, settings file read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds an [`Error::Validation`] from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Builds an [`Error::AccessDenied`] from any displayable message.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// The HTTP status this error surfaces as.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AccessDenied { .. } => StatusCode::FORBIDDEN,
            Self::UserNotFound { .. }
            | Self::FundNotFound { .. }
            | Self::MonthNotFound { .. }
            | Self::PaymentNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal failures are logged with full detail but surface opaquely.
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
