mod relay;

use crate::{ByteStream, CompletionProvider, CompletionRequest, RelayError, Result as RelayErrorResult};

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

pub(crate) const CODING_MODEL: &str = "coding/model";
pub(crate) const GENERAL_MODEL: &str = "general/model";

/// What the fake upstream does when opened
pub(crate) enum Script {
    /// Respond with this HTTP status instead of a stream
    Status(u16),
    /// Stream these chunks (`Err` = transport failure), then end or hang
    Chunks {
        chunks: Vec<Result<&'static str, &'static str>>,
        hang: bool,
    },
}

pub(crate) struct ScriptedProvider {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn chunks(chunks: &[&'static str]) -> Self {
        Self::new(Script::Chunks {
            chunks: chunks.iter().map(|c| Ok(*c)).collect(),
            hang: false,
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn open_stream(&self, request: &CompletionRequest) -> RelayErrorResult<ByteStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.script {
            Script::Status(status) => Err(RelayError::from_status(*status)),
            Script::Chunks { chunks, hang } => {
                let items: Vec<RelayErrorResult<Bytes>> = chunks
                    .iter()
                    .map(|c| match c {
                        Ok(text) => Ok(Bytes::from_static(text.as_bytes())),
                        Err(message) => Err(RelayError::stream(*message)),
                    })
                    .collect();
                let body = stream::iter(items);
                if *hang {
                    Ok(body.chain(stream::pending()).boxed())
                } else {
                    Ok(body.boxed())
                }
            }
        }
    }
}
