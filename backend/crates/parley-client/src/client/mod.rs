pub(crate) mod client;
pub(crate) mod error;
pub(crate) mod event_stream;

pub use client::Client;
pub use error::{ClientError, Result as ClientResult};
pub use event_stream::{EventFrameDecoder, EventStream};
