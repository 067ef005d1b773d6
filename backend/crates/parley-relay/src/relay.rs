//! The streaming relay.
//!
//! `Relay::start` spawns one task per message. The task opens the upstream
//! completion, decodes its event stream and forwards each fragment into a
//! bounded channel that the HTTP layer drains as server-sent events. The
//! task's return value is the state it finished in:
//!
//! ```text
//! Idle -> AwaitingUpstream -> Streaming -> Completed
//!                                       -> UpstreamError
//!                                       -> ClientDisconnected
//! ```
//!
//! Failures after the downstream stream has opened can only be reported as
//! a final `{error}` event. When the receiver is dropped the task stops
//! reading and drops the upstream response with it.

use crate::{
    CompletionProvider, CompletionRequest, Metrics, ModelRouter, RelayError, RelayEvent,
    SseDecoder, UpstreamRecord, error::PROCESSING_ERROR_MESSAGE,
};

use parley_core::Turn;

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Downstream events held for a slow client. At most one event waits in the
/// channel; the relay reads no further upstream until it is taken.
pub(crate) const EVENT_BUFFER: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    AwaitingUpstream,
    Streaming,
    Completed,
    UpstreamError,
    ClientDisconnected,
}

impl RelayState {
    pub fn label(&self) -> &'static str {
        match self {
            RelayState::Idle => "idle",
            RelayState::AwaitingUpstream => "awaiting_upstream",
            RelayState::Streaming => "streaming",
            RelayState::Completed => "completed",
            RelayState::UpstreamError => "upstream_error",
            RelayState::ClientDisconnected => "client_disconnected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RelayState::Completed | RelayState::UpstreamError | RelayState::ClientDisconnected
        )
    }
}

/// Sampling parameters sent with every completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaySettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 2048,
        }
    }
}

pub struct RelayHandle {
    pub events: mpsc::Receiver<RelayEvent>,
    pub task: JoinHandle<RelayState>,
}

pub struct Relay {
    provider: Arc<dyn CompletionProvider>,
    router: ModelRouter,
    settings: RelaySettings,
    metrics: Metrics,
}

impl Relay {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        router: ModelRouter,
        settings: RelaySettings,
    ) -> Self {
        Self {
            provider,
            router,
            settings,
            metrics: Metrics::new(),
        }
    }

    /// Prior turns followed by the new user turn, addressed to the routed model
    pub fn build_request(&self, history: Vec<Turn>, message: &str) -> CompletionRequest {
        let mut messages = history;
        messages.push(Turn::user(message));

        CompletionRequest {
            model: self.router.select(message).to_string(),
            messages,
            stream: true,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Spawn the relay task for one authenticated, non-empty message
    pub fn start(&self, history: Vec<Turn>, message: &str) -> RelayHandle {
        let request = self.build_request(history, message);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let provider = Arc::clone(&self.provider);
        let metrics = self.metrics.clone();

        log::debug!(
            "Relay {} -> {} ({} turns)",
            RelayState::Idle.label(),
            RelayState::AwaitingUpstream.label(),
            request.messages.len()
        );

        let task = tokio::spawn(async move {
            let started = Instant::now();
            metrics.stream_started(&request.model);

            let state = run(provider, request, tx, &metrics).await;

            metrics.stream_finished(state, started.elapsed());
            log::info!(
                "Relay finished in {} after {:?}",
                state.label(),
                started.elapsed()
            );
            state
        });

        RelayHandle { events: rx, task }
    }
}

async fn run(
    provider: Arc<dyn CompletionProvider>,
    request: CompletionRequest,
    tx: mpsc::Sender<RelayEvent>,
    metrics: &Metrics,
) -> RelayState {
    let opened = tokio::select! {
        biased;
        _ = tx.closed() => return RelayState::ClientDisconnected,
        opened = provider.open_stream(&request) => opened,
    };

    let mut upstream = match opened {
        Ok(stream) => stream,
        Err(e) => return fail(&tx, metrics, e).await,
    };

    let mut state = RelayState::AwaitingUpstream;
    let mut decoder = SseDecoder::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => return RelayState::ClientDisconnected,
            next = upstream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                if state == RelayState::AwaitingUpstream {
                    log::debug!("Relay first upstream byte, now streaming");
                    state = RelayState::Streaming;
                }
                for record in decoder.push(&chunk) {
                    if let Some(end) = forward(&tx, metrics, record).await {
                        return end;
                    }
                }
            }
            Some(Err(e)) => return fail(&tx, metrics, e).await,
            None => {
                if let Some(record) = decoder.finish()
                    && let Some(end) = forward(&tx, metrics, record).await
                {
                    return end;
                }
                return RelayState::Completed;
            }
        }
    }
}

/// Send one decoded record downstream. `Some` means the relay is finished.
async fn forward(
    tx: &mpsc::Sender<RelayEvent>,
    metrics: &Metrics,
    record: UpstreamRecord,
) -> Option<RelayState> {
    let (event, end) = match record {
        UpstreamRecord::Delta(fragment) => (RelayEvent::content(fragment), None),
        UpstreamRecord::Done => (RelayEvent::finish(), Some(RelayState::Completed)),
        UpstreamRecord::Error(message) => {
            log::warn!("Upstream reported an error mid-stream: {message}");
            metrics.upstream_error("in_stream");
            (
                RelayEvent::error(PROCESSING_ERROR_MESSAGE),
                Some(RelayState::UpstreamError),
            )
        }
    };

    let is_content = !event.is_terminal();
    if tx.send(event).await.is_err() {
        return Some(RelayState::ClientDisconnected);
    }
    if is_content {
        metrics.fragment_forwarded();
    }
    end
}

async fn fail(
    tx: &mpsc::Sender<RelayEvent>,
    metrics: &Metrics,
    error: RelayError,
) -> RelayState {
    log::error!("Relay upstream failure: {error}");
    metrics.upstream_error(error.kind());

    if tx.send(RelayEvent::error(error.user_message())).await.is_err() {
        return RelayState::ClientDisconnected;
    }
    RelayState::UpstreamError
}
