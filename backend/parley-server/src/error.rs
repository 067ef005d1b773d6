use thiserror::Error;

/// Startup and shutdown failures of the server binary
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] parley_config::ConfigError),

    #[error("Auth setup error: {0}")]
    Auth(#[from] parley_auth::AuthError),

    #[error("Upstream setup error: {0}")]
    Relay(#[from] parley_relay::RelayError),

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Metrics error: {message}")]
    Metrics { message: String },
}

impl ServerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ServerError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
