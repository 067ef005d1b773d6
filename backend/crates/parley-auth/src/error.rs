use std::panic::Location;

use error_location::ErrorLocation;
use parley_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input on '{field}': {message} {location}")]
    InvalidInput {
        field: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Conflict: {message} {location}")]
    Conflict {
        message: String,
        location: ErrorLocation,
    },

    #[error("No pending OTP {location}")]
    OtpNotFound { location: ErrorLocation },

    #[error("OTP expired {location}")]
    OtpExpired { location: ErrorLocation },

    #[error("OTP mismatch {location}")]
    OtpMismatch { location: ErrorLocation },

    #[error("Invalid credentials {location}")]
    InvalidCredentials { location: ErrorLocation },

    #[error("Account not verified {location}")]
    Unverified { location: ErrorLocation },

    #[error("Missing or unknown session token {location}")]
    Unauthenticated { location: ErrorLocation },

    #[error("Session expired {location}")]
    SessionExpired { location: ErrorLocation },

    #[error("OTP delivery failed: {message} {location}")]
    DeliveryFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Too many OTP requests: {limit} per {window_secs}s {location}")]
    RateLimited {
        limit: u32,
        window_secs: u64,
        location: ErrorLocation,
    },

    #[error("Identity provider error: {message} {location}")]
    Provider {
        message: String,
        location: ErrorLocation,
    },

    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl AuthError {
    #[track_caller]
    pub fn invalid_input<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn otp_not_found() -> Self {
        Self::OtpNotFound {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn otp_expired() -> Self {
        Self::OtpExpired {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn otp_mismatch() -> Self {
        Self::OtpMismatch {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unverified() -> Self {
        Self::Unverified {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_expired() -> Self {
        Self::SessionExpired {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn delivery_failed<S: Into<String>>(message: S) -> Self {
        Self::DeliveryFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Conflict { .. } => "CONFLICT",
            Self::OtpNotFound { .. } => "OTP_NOT_FOUND",
            Self::OtpExpired { .. } => "OTP_EXPIRED",
            Self::OtpMismatch { .. } => "OTP_MISMATCH",
            Self::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            Self::Unverified { .. } => "UNVERIFIED",
            Self::Unauthenticated { .. } => "UNAUTHENTICATED",
            Self::SessionExpired { .. } => "SESSION_EXPIRED",
            Self::DeliveryFailed { .. } => "DELIVERY_FAILED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Message suitable for an HTTP response body
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidInput { message, .. } => message.clone(),
            Self::Conflict { message, .. } => message.clone(),
            Self::OtpNotFound { .. } => "No OTP found for this email".to_string(),
            Self::OtpExpired { .. } => "OTP has expired".to_string(),
            Self::OtpMismatch { .. } => "Invalid OTP".to_string(),
            Self::InvalidCredentials { .. } => "Invalid email or password".to_string(),
            Self::Unverified { .. } => "Please verify your email first".to_string(),
            Self::Unauthenticated { .. } => "Unauthorized".to_string(),
            Self::SessionExpired { .. } => "Session expired".to_string(),
            Self::DeliveryFailed { .. } => "Failed to send OTP".to_string(),
            Self::RateLimited { .. } => {
                "Too many OTP requests, please wait and try again".to_string()
            }
            Self::Provider { .. } => "Authentication failed".to_string(),
            Self::Internal { .. } => "Internal server error".to_string(),
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<CoreError> for AuthError {
    #[track_caller]
    fn from(err: CoreError) -> Self {
        Self::invalid_input(err.field(), err.message())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
