use crate::error::{PROCESSING_ERROR_MESSAGE, RATE_LIMITED_MESSAGE, UNAUTHORIZED_MESSAGE};
use crate::tests::{CODING_MODEL, GENERAL_MODEL, Script, ScriptedProvider};
use crate::relay::EVENT_BUFFER;
use crate::{ModelRouter, Relay, RelayEvent, RelaySettings, RelayState};

use parley_core::{Role, Turn};

use std::sync::Arc;
use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::eq;
use tokio::sync::mpsc;

const HI: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n";
const THERE: &str = "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n";
const DONE: &str = "data: [DONE]\n\n";

fn relay(provider: Arc<ScriptedProvider>) -> Relay {
    Relay::new(
        provider,
        ModelRouter::new(CODING_MODEL, GENERAL_MODEL),
        RelaySettings::default(),
    )
}

async fn drain(events: &mut mpsc::Receiver<RelayEvent>) -> Vec<RelayEvent> {
    let mut out = Vec::new();
    while let Some(event) = events.recv().await {
        out.push(event);
    }
    out
}

fn reconstruct(events: &[RelayEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            RelayEvent::Content { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn given_two_deltas_then_done_when_relayed_then_content_content_finish() {
    // Given
    let provider = Arc::new(ScriptedProvider::chunks(&[HI, THERE, DONE]));
    let relay = relay(provider.clone());

    // When
    let mut handle = relay.start(vec![], "hello");
    let events = drain(&mut handle.events).await;
    let state = handle.task.await.unwrap();

    // Then
    assert_that!(
        events,
        eq(&vec![
            RelayEvent::content("Hi"),
            RelayEvent::content(" there"),
            RelayEvent::finish(),
        ])
    );
    assert_that!(reconstruct(&events).as_str(), eq("Hi there"));
    assert_that!(state, eq(RelayState::Completed));
}

#[tokio::test]
async fn given_malformed_line_between_valid_ones_when_relayed_then_stream_continues() {
    let provider = Arc::new(ScriptedProvider::chunks(&[
        HI,
        "data: {\"choices\": oops\n\n",
        THERE,
        DONE,
    ]));

    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;

    assert_that!(reconstruct(&events).as_str(), eq("Hi there"));
    assert_that!(events.last(), eq(Some(&RelayEvent::finish())));
}

#[tokio::test]
async fn given_record_split_between_chunks_when_relayed_then_reassembled() {
    let provider = Arc::new(ScriptedProvider::chunks(&[
        "data: {\"choices\":[{\"delta\":",
        "{\"content\":\"Hi\"}}]}\n\ndata: [DO",
        "NE]\n\n",
    ]));

    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;

    assert_that!(
        events,
        eq(&vec![RelayEvent::content("Hi"), RelayEvent::finish()])
    );
}

#[tokio::test]
async fn given_upstream_429_when_relayed_then_single_rate_limit_error_event() {
    let provider = Arc::new(ScriptedProvider::new(Script::Status(429)));

    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;
    let state = handle.task.await.unwrap();

    assert_that!(events, eq(&vec![RelayEvent::error(RATE_LIMITED_MESSAGE)]));
    assert_that!(state, eq(RelayState::UpstreamError));
}

#[tokio::test]
async fn given_upstream_401_when_relayed_then_key_error_event() {
    let provider = Arc::new(ScriptedProvider::new(Script::Status(401)));

    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;

    assert_that!(events, eq(&vec![RelayEvent::error(UNAUTHORIZED_MESSAGE)]));
}

#[tokio::test]
async fn given_upstream_500_when_relayed_then_generic_error_event() {
    let provider = Arc::new(ScriptedProvider::new(Script::Status(503)));

    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;

    assert_that!(events, eq(&vec![RelayEvent::error(PROCESSING_ERROR_MESSAGE)]));
}

#[tokio::test]
async fn given_transport_failure_mid_stream_when_relayed_then_content_then_one_error() {
    // Given
    let provider = Arc::new(ScriptedProvider::new(Script::Chunks {
        chunks: vec![Ok(HI), Err("connection reset")],
        hang: false,
    }));

    // When
    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;
    let state = handle.task.await.unwrap();

    // Then
    assert_that!(
        events,
        eq(&vec![
            RelayEvent::content("Hi"),
            RelayEvent::error(PROCESSING_ERROR_MESSAGE),
        ])
    );
    assert_that!(state, eq(RelayState::UpstreamError));
}

#[tokio::test]
async fn given_upstream_closes_without_done_when_relayed_then_completed_without_finish() {
    let provider = Arc::new(ScriptedProvider::chunks(&[HI, THERE]));

    let mut handle = relay(provider).start(vec![], "hello");
    let events = drain(&mut handle.events).await;
    let state = handle.task.await.unwrap();

    assert_that!(reconstruct(&events).as_str(), eq("Hi there"));
    assert_that!(state, eq(RelayState::Completed));
}

#[tokio::test]
async fn given_client_drops_receiver_when_upstream_still_open_then_client_disconnected() {
    // Given
    let provider = Arc::new(ScriptedProvider::new(Script::Chunks {
        chunks: vec![Ok(HI)],
        hang: true,
    }));
    let mut handle = relay(provider).start(vec![], "hello");
    let first = handle.events.recv().await;
    assert_that!(first, eq(&Some(RelayEvent::content("Hi"))));

    // When
    drop(handle.events);
    let state = tokio::time::timeout(Duration::from_secs(5), handle.task)
        .await
        .expect("relay task should stop promptly")
        .unwrap();

    // Then
    assert_that!(state, eq(RelayState::ClientDisconnected));
}

#[tokio::test]
async fn given_client_not_reading_when_upstream_has_more_then_relay_holds_one_event() {
    // Given
    let provider = Arc::new(ScriptedProvider::chunks(&[HI, THERE, HI, THERE, DONE]));
    let mut handle = relay(provider).start(vec![], "hello");

    // When
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Then
    assert_that!(handle.events.max_capacity(), eq(EVENT_BUFFER));
    assert_that!(handle.events.len(), eq(1));
    assert!(!handle.task.is_finished());

    let events = drain(&mut handle.events).await;
    assert_that!(reconstruct(&events).as_str(), eq("Hi thereHi there"));
    assert_that!(handle.task.await.unwrap(), eq(RelayState::Completed));
}

#[tokio::test]
async fn given_history_when_build_request_then_history_then_user_turn_with_fixed_sampling() {
    // Given
    let provider = Arc::new(ScriptedProvider::chunks(&[DONE]));
    let relay = relay(provider.clone());
    let history = vec![Turn::user("hi"), Turn::assistant("hello!")];

    // When
    let mut handle = relay.start(history, "why does my python loop never end");
    drain(&mut handle.events).await;

    // Then
    let request = provider.last_request().unwrap();
    assert_that!(provider.calls(), eq(1));
    assert_that!(request.model.as_str(), eq(CODING_MODEL));
    assert_that!(request.messages.len(), eq(3));
    assert_that!(request.messages[2].role, eq(Role::User));
    assert_that!(
        request.messages[2].content.as_str(),
        eq("why does my python loop never end")
    );
    assert!(request.stream);
    assert_that!(request.temperature, eq(0.7));
    assert_that!(request.top_p, eq(1.0));
    assert_that!(request.max_tokens, eq(2048));
}

#[test]
fn given_terminal_states_when_is_terminal_then_true_only_for_end_states() {
    assert!(!RelayState::Idle.is_terminal());
    assert!(!RelayState::AwaitingUpstream.is_terminal());
    assert!(!RelayState::Streaming.is_terminal());
    assert!(RelayState::Completed.is_terminal());
    assert!(RelayState::UpstreamError.is_terminal());
    assert!(RelayState::ClientDisconnected.is_terminal());
}
