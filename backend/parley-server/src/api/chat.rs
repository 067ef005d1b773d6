use crate::{
    ApiError, ApiResult, AppState,
    api::extractors::{api_json::ApiJson, bearer_token::BearerToken},
};

use parley_core::api::SendMessageRequest;
use parley_relay::RelayHandle;

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::Stream;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};

/// POST /api/send-message
///
/// The session is checked and the message validated before anything is
/// sent upstream. From then on the response is an event stream and every
/// outcome, including upstream failure, arrives as an event.
pub async fn send_message(
    State(state): State<AppState>,
    BearerToken(header_token): BearerToken,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let token = request
        .session_token
        .filter(|token| !token.trim().is_empty())
        .or(header_token);

    let session = state
        .sessions
        .authenticate(token.as_deref())
        .await
        .map_err(|e| state.reject(e))?;

    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }

    log::debug!(
        "Message from {} with {} prior turns",
        session.email,
        request.conversation_history.len()
    );

    let RelayHandle { events, task } = state
        .relay
        .start(request.conversation_history, &request.message);

    tokio::spawn(async move {
        if let Err(e) = task.await {
            log::error!("Relay task for {} failed: {e}", session.email);
        }
    });

    let stream = ReceiverStream::new(events)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.to_json())));

    Ok(Sse::new(stream))
}
