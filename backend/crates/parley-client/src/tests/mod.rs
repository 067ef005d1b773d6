mod event_stream;

use crate::{HistoryEntry, MessageView};

/// Records every call a stream makes against its view
#[derive(Debug, Default)]
pub(crate) struct RecordingView {
    pub renders: Vec<String>,
    pub errors: Vec<String>,
    pub history_refreshes: Vec<Vec<HistoryEntry>>,
}

impl MessageView for RecordingView {
    fn render_markdown(&mut self, markdown: &str) {
        self.renders.push(markdown.to_string());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn refresh_history(&mut self, entries: &[HistoryEntry]) {
        self.history_refreshes.push(entries.to_vec());
    }
}
