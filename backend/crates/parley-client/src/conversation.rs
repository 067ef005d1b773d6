//! Conversation bookkeeping on top of [`ClientState`].

use crate::{ClientError, ClientResult, ClientState, HistoryEntry};

use chrono::{DateTime, Duration, Utc};
use parley_core::{Role, Turn};

pub const NEW_CHAT_TITLE: &str = "New chat";
const TITLE_WORDS: usize = 4;
const CONVERSATION_ID_PREFIX: &str = "chat_";

pub fn new_conversation_id(now: DateTime<Utc>) -> String {
    format!("{CONVERSATION_ID_PREFIX}{}", now.timestamp_millis())
}

/// First four words of the first user turn
pub fn derive_title(turns: &[Turn]) -> String {
    let Some(first) = turns.iter().find(|t| t.role == Role::User) else {
        return NEW_CHAT_TITLE.to_string();
    };

    let title = first
        .content
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        NEW_CHAT_TITLE.to_string()
    } else {
        title
    }
}

/// Prefix the message with an attached text file
pub fn compose_message(message: &str, attachment: Option<(&str, &str)>) -> String {
    let message = message.trim();
    match attachment {
        Some((name, content)) => format!("[FILE: {name}]\n{content}\n\n---\n{message}"),
        None => message.to_string(),
    }
}

fn id_millis(id: &str) -> i64 {
    id.strip_prefix(CONVERSATION_ID_PREFIX)
        .and_then(|m| m.parse().ok())
        .unwrap_or(0)
}

impl ClientState {
    /// Create an empty conversation and make it current
    pub fn begin_conversation(&mut self, now: DateTime<Utc>) -> String {
        let mut at = now;
        let mut id = new_conversation_id(at);
        while self.conversations.contains_key(&id) {
            at += Duration::milliseconds(1);
            id = new_conversation_id(at);
        }

        self.conversations.insert(id.clone(), Vec::new());
        self.current_conversation_id = Some(id.clone());
        id
    }

    /// Current conversation id, creating one when none is active
    pub fn ensure_conversation(&mut self, now: DateTime<Utc>) -> String {
        match &self.current_conversation_id {
            Some(id) if self.conversations.contains_key(id) => id.clone(),
            _ => self.begin_conversation(now),
        }
    }

    /// Leave the current conversation; the next message starts a new one
    pub fn start_new_chat(&mut self) {
        self.current_conversation_id = None;
    }

    pub fn turns(&self, id: &str) -> &[Turn] {
        self.conversations.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn current_turns(&self) -> &[Turn] {
        match &self.current_conversation_id {
            Some(id) => self.turns(id),
            None => &[],
        }
    }

    /// Append a turn, caching the title once a user turn exists
    pub fn push_turn(&mut self, id: &str, turn: Turn) {
        let turns = self.conversations.entry(id.to_string()).or_default();
        turns.push(turn);

        if !self.conversation_titles.contains_key(id) && turns.iter().any(|t| t.role == Role::User) {
            let title = derive_title(turns);
            self.conversation_titles.insert(id.to_string(), title);
        }
    }

    pub fn title(&self, id: &str) -> String {
        self.conversation_titles
            .get(id)
            .cloned()
            .unwrap_or_else(|| derive_title(self.turns(id)))
    }

    /// Switch to a stored conversation
    pub fn open(&mut self, id: &str) -> ClientResult<&[Turn]> {
        if !self.conversations.contains_key(id) {
            return Err(ClientError::unknown_conversation(id));
        }
        self.current_conversation_id = Some(id.to_string());
        Ok(self.turns(id))
    }

    /// Conversations newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .conversations
            .keys()
            .map(|id| HistoryEntry {
                id: id.clone(),
                title: self.title(id),
                active: self.current_conversation_id.as_deref() == Some(id.as_str()),
            })
            .collect();

        entries.sort_by(|a, b| id_millis(&b.id).cmp(&id_millis(&a.id)).then(b.id.cmp(&a.id)));
        entries
    }
}
