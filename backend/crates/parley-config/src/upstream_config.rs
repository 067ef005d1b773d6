use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CODING_MODEL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_GENERAL_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_REFERER, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P, DEFAULT_UPSTREAM_BASE_URL, MAX_MAX_TOKENS,
};

use serde::Deserialize;

/// Upstream chat-completion provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model used when the message looks like a programming question
    pub coding_model: String,
    /// Model used for everything else
    pub general_model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// Sent as `HTTP-Referer`
    pub referer: String,
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_UPSTREAM_BASE_URL),
            api_key: None,
            coding_model: String::from(DEFAULT_CODING_MODEL),
            general_model: String::from(DEFAULT_GENERAL_MODEL),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
            referer: String::from(DEFAULT_REFERER),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl UpstreamConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::upstream(format!(
                "upstream.base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if self.coding_model.trim().is_empty() || self.general_model.trim().is_empty() {
            return Err(ConfigError::upstream(
                "upstream.coding_model and upstream.general_model cannot be empty",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::upstream(format!(
                "upstream.temperature must be 0.0-2.0, got {}",
                self.temperature
            )));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigError::upstream(format!(
                "upstream.top_p must be in (0.0, 1.0], got {}",
                self.top_p
            )));
        }

        if self.max_tokens == 0 || self.max_tokens > MAX_MAX_TOKENS {
            return Err(ConfigError::upstream(format!(
                "upstream.max_tokens must be 1-{}, got {}",
                MAX_MAX_TOKENS, self.max_tokens
            )));
        }

        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::upstream(
                "upstream.connect_timeout_secs must be > 0",
            ));
        }

        Ok(())
    }

    /// Full completion endpoint URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
