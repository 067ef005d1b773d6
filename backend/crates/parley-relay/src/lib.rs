pub mod error;
pub mod metrics;
pub mod model_router;
pub mod relay;
pub mod relay_event;
pub mod sse_decoder;
pub mod upstream;

pub use error::{RelayError, Result};
pub use metrics::Metrics;
pub use model_router::ModelRouter;
pub use relay::{Relay, RelayHandle, RelaySettings, RelayState};
pub use relay_event::RelayEvent;
pub use sse_decoder::{SseDecoder, UpstreamRecord};
pub use upstream::{ByteStream, CompletionProvider, CompletionRequest, OpenRouterProvider};

#[cfg(test)]
mod tests;
