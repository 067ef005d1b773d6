//! Client-side state blob.
//!
//! The JSON shape is shared with the browser front-end's local storage,
//! so field names are fixed: `sessionToken`, `userEmail`, `userName`,
//! `displayName`, `profilePhoto`, `userId`, `conversations`,
//! `conversationTitles`, `currentConversationId`.

use crate::{ClientError, ClientResult};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parley_core::{PublicProfile, Turn};
use serde::{Deserialize, Serialize};

pub const STATE_FILE_NAME: &str = "state.json";
const STATE_DIR_NAME: &str = "parley";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientState {
    pub session_token: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub profile_photo: Option<String>,
    pub user_id: Option<String>,
    pub conversations: BTreeMap<String, Vec<Turn>>,
    pub conversation_titles: BTreeMap<String, String>,
    pub current_conversation_id: Option<String>,
}

impl ClientState {
    pub fn is_signed_in(&self) -> bool {
        self.session_token.is_some()
    }

    /// Record a fresh session. Profile fields are replaced only when the
    /// server returned a profile.
    pub fn sign_in(&mut self, session_token: String, email: String, profile: Option<PublicProfile>) {
        self.session_token = Some(session_token);
        self.user_email = Some(email);

        if let Some(profile) = profile {
            self.user_id = Some(profile.user_id);
            self.user_name = Some(profile.username);
            self.display_name = Some(profile.display_name);
            self.profile_photo = Some(profile.profile_photo);
        }
    }

    /// Forget the session and identity. Conversations stay on disk.
    pub fn sign_out(&mut self) {
        self.session_token = None;
        self.user_email = None;
        self.user_name = None;
        self.display_name = None;
        self.profile_photo = None;
        self.user_id = None;
    }
}

/// Location of the persisted state blob
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STATE_FILE_NAME),
        }
    }

    /// `<data dir>/parley/state.json`, falling back to `./.parley`
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join(STATE_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(".parley"));
        Self::in_dir(&dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the blob; a missing file is an empty state
    pub fn load(&self) -> ClientResult<ClientState> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientState::default()),
            Err(e) => Err(ClientError::state(&self.path, e)),
        }
    }

    /// Write via a temp file and rename so a crash never leaves half a blob
    pub fn save(&self, state: &ClientState) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::state(parent, e))?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| ClientError::state(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| ClientError::state(&self.path, e))?;

        log::debug!("Saved client state to {}", self.path.display());
        Ok(())
    }
}
