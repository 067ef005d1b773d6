use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

pub const RATE_LIMITED_MESSAGE: &str =
    "The assistant is busy right now (upstream rate limit reached). Please try again shortly.";
pub const UNAUTHORIZED_MESSAGE: &str = "The upstream API key is not valid.";
pub const PROCESSING_ERROR_MESSAGE: &str = "An error occurred while processing your message.";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Upstream rate limit reached {location}")]
    RateLimited { location: ErrorLocation },

    #[error("Upstream rejected the API key {location}")]
    Unauthorized { location: ErrorLocation },

    #[error("Upstream returned status {status} {location}")]
    UpstreamStatus {
        status: u16,
        location: ErrorLocation,
    },

    #[error("Upstream transport error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    #[error("Upstream stream error: {message} {location}")]
    Stream {
        message: String,
        location: ErrorLocation,
    },
}

impl RelayError {
    /// Map a non-success upstream status
    #[track_caller]
    pub fn from_status(status: u16) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match status {
            429 => Self::RateLimited { location },
            401 => Self::Unauthorized { location },
            _ => Self::UpstreamStatus { status, location },
        }
    }

    #[track_caller]
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn stream<S: Into<String>>(message: S) -> Self {
        Self::Stream {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Text sent to the browser in the final `{error}` event
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => RATE_LIMITED_MESSAGE,
            Self::Unauthorized { .. } => UNAUTHORIZED_MESSAGE,
            _ => PROCESSING_ERROR_MESSAGE,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthorized { .. } => "unauthorized",
            Self::UpstreamStatus { .. } => "status",
            Self::Transport { .. } => "transport",
            Self::Stream { .. } => "stream",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
