//! Account registration.
//!
//! Registering creates an unverified identity and sends a registration code.
//! Verifying that code flips the identity to verified and issues a session.
//! An unverified identity whose code has expired no longer blocks its email
//! or username: registering again replaces it.

use crate::{
    AuthError, IssuedSession, OtpAuthenticator, OtpPurpose, Result as AuthErrorResult,
    SessionManager, password::hash_password,
};

use parley_core::validation::{
    validate_email, validate_password, validate_required, validate_username,
};
use parley_core::{Clock, Identity, IdentityStore, NewIdentity};

use std::sync::Arc;

use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub profile_photo: Option<String>,
}

/// Returned by `register`; the client proceeds to OTP verification with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub user_id: String,
    pub email: String,
}

pub struct Registrar {
    identities: IdentityStore,
    otp: Arc<OtpAuthenticator>,
    sessions: Arc<SessionManager>,
    clock: Arc<dyn Clock>,
    min_password_length: usize,
    /// Serializes the uniqueness check with the insert
    claim_lock: Mutex<()>,
}

impl Registrar {
    pub fn new(
        identities: IdentityStore,
        otp: Arc<OtpAuthenticator>,
        sessions: Arc<SessionManager>,
        clock: Arc<dyn Clock>,
        min_password_length: usize,
    ) -> Self {
        Self {
            identities,
            otp,
            sessions,
            clock,
            min_password_length,
            claim_lock: Mutex::new(()),
        }
    }

    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> AuthErrorResult<PendingRegistration> {
        validate_required(&request.username, "username")?;
        validate_required(&request.email, "email")?;
        validate_required(&request.password, "password")?;
        validate_required(&request.display_name, "displayName")?;
        validate_email(&request.email)?;
        validate_password(&request.password, self.min_password_length)?;
        validate_username(&request.username)?;

        let password_hash = hash_password(&request.password).await?;

        let identity = {
            let _claim = self.claim_lock.lock().await;
            self.ensure_available(&request.username, &request.email)
                .await?;

            let identity = Identity::registered(
                NewIdentity {
                    username: request.username,
                    email: request.email,
                    display_name: request.display_name,
                    profile_photo: request.profile_photo,
                },
                password_hash,
                self.clock.now(),
            );
            self.identities
                .put(identity.email.clone(), identity.clone())
                .await;
            identity
        };

        if let Err(e) = self
            .otp
            .issue(&identity.email, OtpPurpose::Registration)
            .await
        {
            // No code reached the user, so the identity would only squat the email.
            let user_id = identity.user_id.clone();
            self.identities
                .remove_if(
                    &identity.email,
                    Box::new(move |current: &Identity| current.user_id == user_id),
                )
                .await;
            log::warn!(
                "Registration for {} rolled back: {}",
                identity.email,
                e.error_code()
            );
            return Err(e);
        }

        log::info!("Registered {} ({})", identity.user_id, identity.email);
        Ok(PendingRegistration {
            user_id: identity.user_id,
            email: identity.email,
        })
    }

    /// Check a code and, on success, mark any identity for the email verified
    /// and issue a session. A session is issued even when no identity exists
    /// (plain OTP sign-in).
    pub async fn complete_verification(
        &self,
        email: &str,
        code: &str,
    ) -> AuthErrorResult<IssuedSession> {
        self.otp.verify(email, code).await?;

        let identity = self
            .identities
            .update(
                &email.to_string(),
                Box::new(|identity: &mut Identity| identity.verified = true),
            )
            .await;

        let session = self
            .sessions
            .issue(email, identity.as_ref().map(|i| i.user_id.clone()))
            .await;

        Ok(IssuedSession {
            session,
            profile: identity.map(|i| i.profile()),
        })
    }

    /// Fails `Conflict` when the email or username is held by a verified
    /// identity or by one still waiting on a live code. Stale unverified
    /// holders are removed.
    async fn ensure_available(&self, username: &str, email: &str) -> AuthErrorResult<()> {
        if let Some(existing) = self.identities.get(&email.to_string()).await {
            if self.is_blocking(&existing).await {
                return Err(AuthError::conflict("Email already registered"));
            }
            log::info!("Reclaiming abandoned registration for {email}");
            self.identities.delete(&existing.email).await;
        }

        let wanted = username.to_string();
        let holder = self
            .identities
            .find(Box::new(move |identity: &Identity| identity.username == wanted))
            .await;
        if let Some(existing) = holder {
            if self.is_blocking(&existing).await {
                return Err(AuthError::conflict("Username already taken"));
            }
            log::info!("Reclaiming abandoned username {username}");
            self.identities.delete(&existing.email).await;
        }

        Ok(())
    }

    async fn is_blocking(&self, identity: &Identity) -> bool {
        identity.verified || self.otp.has_live_code(&identity.email).await
    }
}
