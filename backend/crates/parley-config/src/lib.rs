mod auth_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod notifier_config;
mod oauth_config;
mod port_file;
mod server_config;
mod upload_config;
mod upstream_config;

pub use auth_config::AuthConfig;
pub use config::{CONFIG_DIR_ENV, Config};
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use notifier_config::NotifierConfig;
pub use oauth_config::OAuthConfig;
pub use port_file::{is_process_running, port_file_info::PortFileInfo};
pub use server_config::ServerConfig;
pub use upload_config::UploadConfig;
pub use upstream_config::UpstreamConfig;

#[cfg(test)]
mod tests;

/// Directory name used when PARLEY_CONFIG_DIR is not set
const DEFAULT_CONFIG_DIR_NAME: &str = ".parley";

// Server
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const MIN_PORT: u16 = 1024;

// Upstream completion API
const DEFAULT_UPSTREAM_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_CODING_MODEL: &str = "anthropic/claude-3.5-sonnet";
const DEFAULT_GENERAL_MODEL: &str = "google/gemini-2.0-flash-001";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 1.0;
const DEFAULT_MAX_TOKENS: u32 = 2048;
const MAX_MAX_TOKENS: u32 = 32768;
const DEFAULT_REFERER: &str = "http://localhost:3000";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Auth
const DEFAULT_OTP_TTL_SECS: u64 = 600;
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_OTP_MAX_REQUESTS: u32 = 5;
const MAX_OTP_MAX_REQUESTS: u32 = 1000;
const DEFAULT_OTP_WINDOW_SECS: u64 = 60;
const MAX_OTP_WINDOW_SECS: u64 = 3600;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

// OAuth
const DEFAULT_GOOGLE_AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

// Notifier
const DEFAULT_SENDER: &str = "no-reply@parley.local";

// Uploads
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;
const MAX_UPLOAD_MAX_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_ALLOWED_MIME_TYPES: [&str; 5] = [
    "text/plain",
    "text/javascript",
    "text/x-python",
    "text/html",
    "application/pdf",
];

// Logging
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
