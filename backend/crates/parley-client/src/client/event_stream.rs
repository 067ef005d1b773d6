use crate::{ClientError, ClientResult};

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use parley_relay::RelayEvent;

const DATA_PREFIX: &str = "data:";

/// Events of one `/api/send-message` reply, in arrival order
pub type EventStream = BoxStream<'static, ClientResult<RelayEvent>>;

/// Splits a `text/event-stream` body into relay events.
///
/// Network reads can end anywhere, including inside a frame or a UTF-8
/// sequence, so bytes are buffered until a full line is available.
/// Lines that are not `data:` frames, or whose payload is not a relay
/// event, are skipped.
#[derive(Debug, Default)]
pub struct EventFrameDecoder {
    buffer: Vec<u8>,
}

impl EventFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<RelayEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = Self::parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Decode whatever is left once the body has ended
    pub fn finish(&mut self) -> Option<RelayEvent> {
        let rest = std::mem::take(&mut self.buffer);
        Self::parse_line(&rest)
    }

    fn parse_line(line: &[u8]) -> Option<RelayEvent> {
        let line = String::from_utf8_lossy(line);
        let payload = line.trim_end_matches(['\r', '\n']).strip_prefix(DATA_PREFIX)?;

        match serde_json::from_str::<RelayEvent>(payload.trim_start()) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("Skipping unreadable event frame: {e}");
                None
            }
        }
    }
}

struct FrameState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: EventFrameDecoder,
    ready: VecDeque<RelayEvent>,
    done: bool,
}

/// Turn a streaming response body into relay events
pub(crate) fn decode_body(body: BoxStream<'static, reqwest::Result<Bytes>>) -> EventStream {
    let state = FrameState {
        body,
        decoder: EventFrameDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.ready.extend(state.decoder.push(&chunk)),
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(ClientError::from_reqwest(e)), state));
                }
                None => {
                    state.done = true;
                    state.ready.extend(state.decoder.finish());
                }
            }
        }
    })
    .boxed()
}
