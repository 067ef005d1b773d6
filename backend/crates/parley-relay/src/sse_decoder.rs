//! Incremental decoder for the upstream `text/event-stream` body.
//!
//! Network reads do not respect line boundaries, so bytes are buffered until
//! a full line is available. Only `data: ` lines matter: `[DONE]` ends the
//! stream, a JSON chunk yields its `choices[0].delta.content`. Anything that
//! fails to parse is skipped.

use serde::Deserialize;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamRecord {
    /// A non-empty text fragment
    Delta(String),
    /// The provider reported a failure inside the stream
    Error(String),
    Done,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChunkError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once `[DONE]` has been seen; later input is ignored
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one network chunk, returning the records completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<UpstreamRecord> {
        if self.done {
            return Vec::new();
        }
        self.pending.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(record) = self.decode_line(&line[..line.len() - 1]) {
                records.push(record);
                if self.done {
                    self.pending.clear();
                    break;
                }
            }
        }
        records
    }

    /// Flush a final line that arrived without a trailing newline
    pub fn finish(&mut self) -> Option<UpstreamRecord> {
        if self.done || self.pending.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.pending);
        self.decode_line(&line)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<UpstreamRecord> {
        let line = String::from_utf8_lossy(raw);
        let line = line.strip_suffix('\r').unwrap_or(&line);

        let payload = line.strip_prefix(DATA_PREFIX)?;
        let payload = payload.strip_prefix(' ').unwrap_or(payload);

        if payload.trim() == DONE_SENTINEL {
            self.done = true;
            return Some(UpstreamRecord::Done);
        }
        if payload.trim().is_empty() {
            return None;
        }

        let chunk: CompletionChunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(e) => {
                log::debug!("Skipping malformed upstream record: {e}");
                return None;
            }
        };

        if let Some(error) = chunk.error {
            return Some(UpstreamRecord::Error(
                error.message.unwrap_or_else(|| "unknown upstream error".into()),
            ));
        }

        chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty())
            .map(UpstreamRecord::Delta)
    }
}
