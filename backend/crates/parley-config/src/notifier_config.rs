use crate::DEFAULT_SENDER;

use serde::Deserialize;

/// Where one-time codes are delivered
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Mail relay webhook. When absent, codes are written to the log.
    pub webhook_url: Option<String>,
    pub sender: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            sender: String::from(DEFAULT_SENDER),
        }
    }
}
