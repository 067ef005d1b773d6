use crate::{
    Client, ClientError, ClientResult, ClientState, MessageView, StateFile, StreamAccumulator,
    StreamOutcome,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use parley_core::api::SendMessageRequest;
use parley_core::{Clock, Turn};
use tokio::sync::Mutex;

/// A signed-in chat front-end: client, persisted state and the one-send
/// guard.
pub struct ChatSession {
    client: Client,
    store: StateFile,
    state: Mutex<ClientState>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the send ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> ClientResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ClientError::send_in_flight())
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatSession {
    pub fn new(client: Client, store: StateFile, state: ClientState, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(state),
            clock,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Load state from `store` and wrap it
    pub fn open(client: Client, store: StateFile, clock: Arc<dyn Clock>) -> ClientResult<Self> {
        let state = store.load()?;
        Ok(Self::new(client, store, state, clock))
    }

    pub async fn snapshot(&self) -> ClientState {
        self.state.lock().await.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send `message` in the current conversation and stream the reply
    /// into `view`.
    ///
    /// The user turn is recorded before the request goes out. The
    /// assistant turn is appended only when the stream ends without an
    /// error event. A second call while one is running fails with
    /// `SendInFlight`.
    pub async fn send(&self, message: &str, view: &mut dyn MessageView) -> ClientResult<StreamOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::input("Enter a message first"));
        }

        let _guard = InFlight::acquire(&self.in_flight)?;

        let (conversation_id, request) = {
            let mut state = self.state.lock().await;
            let Some(token) = state.session_token.clone() else {
                return Err(ClientError::not_signed_in());
            };

            let conversation_id = state.ensure_conversation(self.clock.now());
            let history = state.turns(&conversation_id).to_vec();
            state.push_turn(&conversation_id, Turn::user(message));

            let request = SendMessageRequest {
                message: message.to_string(),
                conversation_history: history,
                session_token: Some(token),
            };
            (conversation_id, request)
        };

        let mut events = match self.client.send_message(&request).await {
            Ok(events) => events,
            Err(e) => {
                view.show_error(&e.user_message());
                self.persist().await?;
                return Err(e);
            }
        };

        let mut accumulator = StreamAccumulator::new();
        while let Some(next) = events.next().await {
            match next {
                Ok(event) => {
                    if accumulator.apply(event, view) {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Reply stream broke: {e}");
                    accumulator.fail(&e.user_message(), view);
                    break;
                }
            }
        }
        drop(events);

        let outcome = accumulator.close();
        let mut state = self.state.lock().await;
        if let StreamOutcome::Committed(reply) = &outcome {
            state.push_turn(&conversation_id, Turn::assistant(reply.as_str()));
            self.store.save(&state)?;
            view.refresh_history(&state.history());
        } else {
            self.store.save(&state)?;
        }

        Ok(outcome)
    }

    async fn persist(&self) -> ClientResult<()> {
        let state = self.state.lock().await;
        self.store.save(&state)
    }

    /// Apply `update` to the state and save it
    pub async fn update<F, T>(&self, update: F) -> ClientResult<T>
    where
        F: FnOnce(&mut ClientState) -> T,
    {
        let mut state = self.state.lock().await;
        let value = update(&mut state);
        self.store.save(&state)?;
        Ok(value)
    }
}
