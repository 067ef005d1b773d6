//! Delivery of one-time codes.
//!
//! Delivery is a collaborator behind `OtpNotifier`. `LogNotifier` writes the
//! code to the application log for local development; `WebhookNotifier`
//! hands it to a mail relay over HTTP.

use crate::{AuthError, Result as AuthErrorResult};

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    SignIn,
    Registration,
}

impl OtpPurpose {
    pub fn subject(&self) -> &'static str {
        match self {
            OtpPurpose::SignIn => "Your sign-in code",
            OtpPurpose::Registration => "Verify your email address",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpMessage {
    pub to: String,
    pub subject: String,
    pub code: String,
    pub expires_in_secs: i64,
    pub purpose: OtpPurpose,
}

impl OtpMessage {
    pub fn new(to: &str, code: &str, expires_in_secs: i64, purpose: OtpPurpose) -> Self {
        Self {
            to: to.to_string(),
            subject: purpose.subject().to_string(),
            code: code.to_string(),
            expires_in_secs,
            purpose,
        }
    }
}

#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn deliver(&self, message: &OtpMessage) -> AuthErrorResult<()>;
}

/// Development notifier. The code ends up in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn deliver(&self, message: &OtpMessage) -> AuthErrorResult<()> {
        log::info!(
            "OTP for {} ({:?}): {} (valid {}s)",
            message.to,
            message.purpose,
            message.code,
            message.expires_in_secs
        );
        Ok(())
    }
}

/// POSTs each message as JSON to a mail relay
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    sender: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, sender: impl Into<String>) -> AuthErrorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| AuthError::internal(format!("webhook client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            sender: sender.into(),
        })
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a OtpMessage,
}

#[async_trait]
impl OtpNotifier for WebhookNotifier {
    async fn deliver(&self, message: &OtpMessage) -> AuthErrorResult<()> {
        let payload = WebhookPayload {
            from: &self.sender,
            message,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::delivery_failed(format!("webhook unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::delivery_failed(format!(
                "webhook returned {status}"
            )));
        }

        log::debug!("OTP delivered to {} via webhook", message.to);
        Ok(())
    }
}
