use crate::PublicProfile;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Photo assigned when neither the user nor the identity provider supplies one
pub const DEFAULT_PROFILE_PHOTO: &str = "default-avatar.jpg";

/// A registered account, keyed by email
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. `None` for accounts created through an identity provider,
    /// which can never sign in with a password.
    pub password_hash: Option<String>,
    pub display_name: String,
    pub profile_photo: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration input after validation
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub profile_photo: Option<String>,
}

impl Identity {
    /// Unverified identity created by the registration flow
    pub fn registered(new: NewIdentity, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id: new_user_id(),
            username: new.username,
            email: new.email,
            password_hash: Some(password_hash),
            display_name: new.display_name,
            profile_photo: new
                .profile_photo
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROFILE_PHOTO.to_string()),
            verified: false,
            created_at: now,
        }
    }

    /// Identity asserted by an external provider; verified from the start
    pub fn from_provider(
        email: String,
        name: Option<String>,
        picture: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let local_part = email.split('@').next().unwrap_or_default().to_string();

        Self {
            user_id: new_user_id(),
            username: local_part.clone(),
            display_name: name.filter(|n| !n.trim().is_empty()).unwrap_or(local_part),
            profile_photo: picture
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROFILE_PHOTO.to_string()),
            email,
            password_hash: None,
            verified: true,
            created_at: now,
        }
    }

    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            profile_photo: self.profile_photo.clone(),
        }
    }
}

fn new_user_id() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}
