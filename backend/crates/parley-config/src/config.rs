use crate::{
    AuthConfig, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR_NAME, LoggingConfig,
    NotifierConfig, OAuthConfig, ServerConfig, UploadConfig, UpstreamConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

pub const CONFIG_DIR_ENV: &str = "PARLEY_CONFIG_DIR";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub auth: AuthConfig,
    pub oauth: OAuthConfig,
    pub notifier: NotifierConfig,
    pub uploads: UploadConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from `<config_dir>/config.toml`, falling back to defaults.
    ///
    /// Environment overrides are applied on top. The directory is created
    /// if missing. Call `validate()` afterwards.
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// PARLEY_CONFIG_DIR if set, else `./.parley`
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR_NAME))
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.upstream.validate()?;
        self.auth.validate()?;
        self.oauth.validate()?;
        self.uploads.validate()?;

        if let Some(ref url) = self.notifier.webhook_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::config(format!(
                "notifier.webhook_url must be an http(s) URL, got '{url}'"
            )));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Absolute path of the upload directory
    pub fn uploads_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.uploads.dir))
    }

    /// Public base URL used for OAuth redirects
    pub fn app_url(&self) -> String {
        match self.oauth.app_url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.server.port),
        }
    }

    /// Logs the effective configuration. Keys and secrets are only
    /// reported as present or absent.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (development: {})",
            self.server.host, self.server.port, self.server.development
        );
        info!(
            "  upstream: {} coding={} general={} key={}",
            self.upstream.base_url,
            self.upstream.coding_model,
            self.upstream.general_model,
            if self.upstream.api_key.is_some() {
                "set"
            } else {
                "missing"
            }
        );
        info!(
            "  auth: otp_ttl={}s session_ttl={}s otp_limit={}/{}s",
            self.auth.otp_ttl_secs,
            self.auth.session_ttl_secs,
            self.auth.otp_max_requests,
            self.auth.otp_window_secs
        );
        info!(
            "  oauth: google {}",
            if self.oauth.is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );
        info!(
            "  notifier: {}",
            if self.notifier.webhook_url.is_some() {
                "webhook"
            } else {
                "log"
            }
        );
        info!(
            "  uploads: {} (max {} bytes)",
            self.uploads.dir, self.uploads.max_bytes
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("PARLEY_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("PORT", &mut self.server.port);
        Self::apply_env_parse("PARLEY_SERVER_PORT", &mut self.server.port);
        Self::apply_env_option_string("PARLEY_STATIC_DIR", &mut self.server.static_dir);
        Self::apply_env_bool("PARLEY_DEVELOPMENT", &mut self.server.development);

        // Upstream
        Self::apply_env_string("PARLEY_UPSTREAM_BASE_URL", &mut self.upstream.base_url);
        Self::apply_env_option_string("OPENROUTER_API_KEY", &mut self.upstream.api_key);
        Self::apply_env_option_string("PARLEY_UPSTREAM_API_KEY", &mut self.upstream.api_key);
        Self::apply_env_string("PARLEY_CODING_MODEL", &mut self.upstream.coding_model);
        Self::apply_env_string("PARLEY_GENERAL_MODEL", &mut self.upstream.general_model);
        Self::apply_env_parse("PARLEY_MAX_TOKENS", &mut self.upstream.max_tokens);

        // Auth
        Self::apply_env_parse("PARLEY_OTP_TTL_SECS", &mut self.auth.otp_ttl_secs);
        Self::apply_env_parse("PARLEY_SESSION_TTL_SECS", &mut self.auth.session_ttl_secs);
        Self::apply_env_parse("PARLEY_OTP_MAX_REQUESTS", &mut self.auth.otp_max_requests);
        Self::apply_env_parse("PARLEY_OTP_WINDOW_SECS", &mut self.auth.otp_window_secs);

        // OAuth
        Self::apply_env_option_string("GOOGLE_CLIENT_ID", &mut self.oauth.google_client_id);
        Self::apply_env_option_string(
            "GOOGLE_CLIENT_SECRET",
            &mut self.oauth.google_client_secret,
        );
        Self::apply_env_option_string("APP_URL", &mut self.oauth.app_url);

        // Notifier
        Self::apply_env_option_string("PARLEY_OTP_WEBHOOK_URL", &mut self.notifier.webhook_url);

        // Uploads
        Self::apply_env_string("PARLEY_UPLOAD_DIR", &mut self.uploads.dir);
        Self::apply_env_parse("PARLEY_UPLOAD_MAX_BYTES", &mut self.uploads.max_bytes);

        // Logging
        Self::apply_env_parse("PARLEY_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("PARLEY_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("PARLEY_LOG_FILE", &mut self.logging.file);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true" or "1"
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Empty values are treated as unset
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name)
            && !val.trim().is_empty()
        {
            *target = Some(val);
        }
    }
}
