//! parley-client library
//!
//! HTTP client for the parley server, the persisted client state blob and
//! the streaming conversation accumulator. The `parley` binary is a thin
//! terminal front-end over these.

pub mod accumulator;
pub mod chat_session;
pub mod client;
pub mod conversation;
pub mod state;
pub mod terminal_view;

#[cfg(test)]
mod tests;

pub use accumulator::{HistoryEntry, MessageView, StreamAccumulator, StreamOutcome};
pub use chat_session::ChatSession;
pub use client::{Client, ClientError, ClientResult, EventFrameDecoder, EventStream};
pub use conversation::{NEW_CHAT_TITLE, compose_message, derive_title, new_conversation_id};
pub use state::{ClientState, STATE_FILE_NAME, StateFile};
pub use terminal_view::TerminalView;
