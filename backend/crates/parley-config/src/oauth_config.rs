use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_GOOGLE_AUTHORIZE_ENDPOINT,
    DEFAULT_GOOGLE_TOKEN_ENDPOINT,
};

use serde::Deserialize;

/// Google sign-in. Disabled unless both client id and secret are set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    /// Public base URL of this app. Defaults to http://localhost:<port>.
    pub app_url: Option<String>,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            google_client_id: None,
            google_client_secret: None,
            app_url: None,
            authorize_endpoint: String::from(DEFAULT_GOOGLE_AUTHORIZE_ENDPOINT),
            token_endpoint: String::from(DEFAULT_GOOGLE_TOKEN_ENDPOINT),
        }
    }
}

impl OAuthConfig {
    pub fn is_enabled(&self) -> bool {
        self.google_client_id.is_some() && self.google_client_secret.is_some()
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.google_client_id.is_some() != self.google_client_secret.is_some() {
            return Err(ConfigError::oauth(
                "oauth.google_client_id and oauth.google_client_secret must be set together",
            ));
        }

        if let Some(ref app_url) = self.app_url
            && !(app_url.starts_with("http://") || app_url.starts_with("https://"))
        {
            return Err(ConfigError::oauth(format!(
                "oauth.app_url must be an http(s) URL, got '{app_url}'"
            )));
        }

        Ok(())
    }
}
