use serde::{Deserialize, Serialize};

/// Profile fields that may be returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub profile_photo: String,
}
