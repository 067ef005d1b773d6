use serde::{Deserialize, Serialize};

/// One downstream event. Serializes to exactly `{"content":..}`,
/// `{"finish":true}` or `{"error":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayEvent {
    Content { content: String },
    Finish { finish: bool },
    Error { error: String },
}

impl RelayEvent {
    pub fn content<S: Into<String>>(fragment: S) -> Self {
        Self::Content {
            content: fragment.into(),
        }
    }

    pub fn finish() -> Self {
        Self::Finish { finish: true }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Whether no further events follow this one
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Content { .. })
    }

    /// JSON payload for a `data:` frame
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            // only reachable with a broken serializer; keep the frame well-formed
            Err(_) => String::from(r#"{"error":"serialization failed"}"#),
        }
    }
}
