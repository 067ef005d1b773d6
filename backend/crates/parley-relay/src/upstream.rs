use crate::{RelayError, Result as RelayErrorResult};

use parley_core::Turn;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;

pub type ByteStream = BoxStream<'static, RelayErrorResult<Bytes>>;

/// Streamed chat-completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Turn>,
    pub stream: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Source of streamed completions
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Start a completion. Resolves once response headers arrive; the body
    /// is returned as raw bytes.
    async fn open_stream(&self, request: &CompletionRequest) -> RelayErrorResult<ByteStream>;
}

/// OpenAI-compatible `/chat/completions` endpoint (OpenRouter by default)
pub struct OpenRouterProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    referer: String,
}

impl OpenRouterProvider {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        referer: impl Into<String>,
        connect_timeout: Duration,
    ) -> RelayErrorResult<Self> {
        // no overall timeout: a long answer streams for as long as it takes
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| RelayError::transport(format!("client build failed: {e}")))?;

        if api_key.is_none() {
            log::warn!("No upstream API key configured; completions will be rejected");
        }

        Ok(Self {
            client,
            url: url.into(),
            api_key,
            referer: referer.into(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    async fn open_stream(&self, request: &CompletionRequest) -> RelayErrorResult<ByteStream> {
        let mut builder = self
            .client
            .post(&self.url)
            .header("HTTP-Referer", &self.referer)
            .json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RelayError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::from_status(status.as_u16()));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| RelayError::stream(e.to_string())))
            .boxed())
    }
}
