//! Reassembles a streamed reply into an assistant turn.

use parley_relay::RelayEvent;

/// One row of the conversation list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub active: bool,
}

/// Where the streamed reply is shown
pub trait MessageView {
    /// Called with the whole reply so far after every fragment. The text
    /// only ever grows. Each view projects the Markdown for its own output.
    fn render_markdown(&mut self, markdown: &str);

    /// The stream failed; no turn is committed

    fn show_error(&mut self, message: &str);

    /// The reply was committed and the conversation list changed
    fn refresh_history(&mut self, entries: &[HistoryEntry]);
}

/// How a stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Reply complete; holds the text committed as an assistant turn
    Committed(String),
    /// Stream ended without any content
    Empty,
    /// An error event arrived; nothing was committed
    Failed(String),
}

#[derive(Debug, Default)]
pub struct StreamAccumulator {
    buffer: String,
    failure: Option<String>,
    closed: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Apply one event. Returns true once the stream is over; later
    /// events are ignored.
    pub fn apply(&mut self, event: RelayEvent, view: &mut dyn MessageView) -> bool {
        if self.closed {
            return true;
        }

        match event {
            RelayEvent::Content { content } => {
                if !content.is_empty() {
                    self.buffer.push_str(&content);
                    view.render_markdown(&self.buffer);
                }
            }
            RelayEvent::Finish { .. } => self.closed = true,
            RelayEvent::Error { error } => {
                view.show_error(&error);
                self.failure = Some(error);
                self.closed = true;
            }
        }
        self.closed
    }

    /// Treat a broken connection like an error event
    pub fn fail(&mut self, message: &str, view: &mut dyn MessageView) {
        if self.closed {
            return;
        }
        view.show_error(message);
        self.failure = Some(message.to_string());
        self.closed = true;
    }

    /// Finish the stream. A finish event and a plain connection close both
    /// commit whatever was received.
    pub fn close(self) -> StreamOutcome {
        match self.failure {
            Some(message) => StreamOutcome::Failed(message),
            None if self.buffer.is_empty() => StreamOutcome::Empty,
            None => StreamOutcome::Committed(self.buffer),
        }
    }
}
