use error_location::ErrorLocation;
use std::panic::Location;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the server or managing local state
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error ({status}): {message} {location}")]
    Api {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON parse error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
        #[source]
        source: serde_json::Error,
    },

    #[error("State file error at {path}: {source} {location}")]
    State {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("{message} {location}")]
    Input {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not signed in; run `parley login` or `parley verify-otp` first {location}")]
    NotSignedIn { location: ErrorLocation },

    #[error("Unknown conversation: {id} {location}")]
    UnknownConversation { id: String, location: ErrorLocation },

    #[error("A message is already being sent {location}")]
    SendInFlight { location: ErrorLocation },
}

impl ClientError {
    /// Convert reqwest error with context
    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ClientError::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    /// Convert JSON error with context
    #[track_caller]
    pub fn from_json(err: serde_json::Error) -> Self {
        ClientError::Json {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    #[track_caller]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn state(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClientError::State {
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }

    #[track_caller]
    pub fn input(message: impl Into<String>) -> Self {
        ClientError::Input {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_signed_in() -> Self {
        ClientError::NotSignedIn {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unknown_conversation(id: impl Into<String>) -> Self {
        ClientError::UnknownConversation {
            id: id.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn send_in_flight() -> Self {
        ClientError::SendInFlight {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Text suitable for showing to the user, without source locations
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http { message, .. } => format!("Connection failed: {message}"),
            ClientError::Json { message, .. } => format!("Unexpected server response: {message}"),
            ClientError::State { path, source, .. } => {
                format!("Could not access {}: {source}", path.display())
            }
            ClientError::Input { message, .. } => message.clone(),
            ClientError::NotSignedIn { .. } => {
                "Your session has expired, please sign in again".to_string()
            }
            ClientError::UnknownConversation { id, .. } => format!("No conversation named {id}"),
            ClientError::SendInFlight { .. } => {
                "Wait for the current reply to finish before sending again".to_string()
            }
        }
    }

    /// HTTP status of an API rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        ClientError::from_reqwest(err)
    }
}

impl From<serde_json::Error> for ClientError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        ClientError::from_json(err)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
