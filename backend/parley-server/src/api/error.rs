//! REST API error types
//!
//! Every rejection renders as `{"success": false, "error": ..}` with the
//! matching status. Server-side failures can carry a `details` string,
//! which is only sent in development mode.

use parley_auth::AuthError;
use parley_core::api::ErrorResponse;

use std::panic::Location;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, duplicate registration, bad OTP (400)
    #[error("Bad request: {message} {location}")]
    BadRequest {
        message: String,
        location: ErrorLocation,
    },

    /// Missing, unknown or expired session; wrong credentials (401)
    #[error("Unauthorized: {message} {location}")]
    Unauthorized {
        message: String,
        location: ErrorLocation,
    },

    /// Unverified account, path outside the upload directory (403)
    #[error("Forbidden: {message} {location}")]
    Forbidden {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Too many requests: {message} {location}")]
    TooManyRequests {
        message: String,
        location: ErrorLocation,
    },

    #[error("Internal error: {message} ({details:?}) {location}")]
    Internal {
        message: String,
        details: Option<String>,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: Some(details.into()),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Drop the internal detail outside development mode
    pub fn without_details(self) -> Self {
        match self {
            ApiError::Internal {
                message, location, ..
            } => ApiError::Internal {
                message,
                details: None,
                location,
            },
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = match self {
            ApiError::Internal {
                message, details, ..
            } => ErrorResponse::new(message, details),
            ApiError::BadRequest { message, .. }
            | ApiError::Unauthorized { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::TooManyRequests { message, .. } => ErrorResponse::new(message, None),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    #[track_caller]
    fn from(e: AuthError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        let message = e.client_message();

        match e {
            AuthError::InvalidInput { .. }
            | AuthError::Conflict { .. }
            | AuthError::OtpNotFound { .. }
            | AuthError::OtpExpired { .. }
            | AuthError::OtpMismatch { .. } => ApiError::BadRequest { message, location },
            AuthError::Unauthenticated { .. }
            | AuthError::SessionExpired { .. }
            | AuthError::InvalidCredentials { .. } => ApiError::Unauthorized { message, location },
            AuthError::Unverified { .. } => ApiError::Forbidden { message, location },
            AuthError::RateLimited { .. } => ApiError::TooManyRequests { message, location },
            AuthError::DeliveryFailed { .. }
            | AuthError::Provider { .. }
            | AuthError::Internal { .. } => ApiError::Internal {
                message,
                details: Some(e.to_string()),
                location,
            },
        }
    }
}

/// Unreadable JSON bodies get the same envelope as every other rejection
impl From<JsonRejection> for ApiError {
    #[track_caller]
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: format!("Invalid request body: {}", e.body_text()),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
