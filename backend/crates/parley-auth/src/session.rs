use crate::{
    AuthError, IdentityProvider, IssuedSession, Result as AuthErrorResult,
    password::verify_password, token::generate_session_token,
};

use parley_core::{Clock, Identity, IdentityStore, Session, SessionStore};

use std::sync::Arc;

use chrono::Duration;
use metrics::counter;

/// Issues bearer sessions and checks them on privileged calls
pub struct SessionManager {
    sessions: SessionStore,
    identities: IdentityStore,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(
        sessions: SessionStore,
        identities: IdentityStore,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            identities,
            clock,
            ttl,
        }
    }

    /// Store a new session bound to `email`
    pub async fn issue(&self, email: &str, user_id: Option<String>) -> Session {
        let mut session = Session::new(
            generate_session_token(),
            email.to_string(),
            user_id,
            self.clock.now(),
            self.ttl,
        );

        // regenerate on the (practically impossible) token collision
        while !self
            .sessions
            .insert_if_absent(session.token.clone(), session.clone())
            .await
        {
            session.token = generate_session_token();
        }

        counter!("parley_sessions_issued_total").increment(1);
        session
    }

    /// Password sign-in. Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> AuthErrorResult<IssuedSession> {
        let identity = self.identities.get(&email.to_string()).await;

        let Some(identity) = identity else {
            counter!("parley_logins_failed_total").increment(1);
            return Err(AuthError::invalid_credentials());
        };

        let matches = match identity.password_hash {
            Some(ref hash) => verify_password(password, hash).await?,
            None => false,
        };
        if !matches {
            counter!("parley_logins_failed_total").increment(1);
            return Err(AuthError::invalid_credentials());
        }

        if !identity.verified {
            counter!("parley_logins_failed_total").increment(1);
            return Err(AuthError::unverified());
        }

        let session = self
            .issue(&identity.email, Some(identity.user_id.clone()))
            .await;
        log::info!("User {} logged in", identity.user_id);

        Ok(IssuedSession {
            session,
            profile: Some(identity.profile()),
        })
    }

    /// Resolve a presented token. Expired sessions are evicted on detection.
    pub async fn authenticate(&self, token: Option<&str>) -> AuthErrorResult<Session> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(AuthError::unauthenticated()),
        };

        let session = self
            .sessions
            .get(&token)
            .await
            .ok_or_else(AuthError::unauthenticated)?;

        if session.is_expired(self.clock.now()) {
            self.sessions.delete(&token).await;
            return Err(AuthError::session_expired());
        }

        Ok(session)
    }

    /// Sign in through an external provider, creating a verified identity on
    /// first use. An unverified identity under the same email is replaced.
    pub async fn oauth_exchange(
        &self,
        provider: &dyn IdentityProvider,
        code: &str,
        redirect_uri: &str,
    ) -> AuthErrorResult<IssuedSession> {
        if code.trim().is_empty() {
            return Err(AuthError::invalid_input("code", "Authorization code missing"));
        }

        let asserted = provider.exchange(code, redirect_uri).await?;
        let key = asserted.email.clone();

        let candidate = Identity::from_provider(
            asserted.email,
            asserted.name,
            asserted.picture,
            self.clock.now(),
        );
        if self
            .identities
            .insert_if_absent(key.clone(), candidate.clone())
            .await
        {
            log::info!("Created identity for {key} from identity provider");
        }

        // A pending registration never proved control of the address, so the
        // provider-derived identity replaces it and its password hash.
        let identity = self
            .identities
            .update(
                &key,
                Box::new(move |identity: &mut Identity| {
                    if !identity.verified {
                        log::warn!(
                            "Replacing unverified identity for {} with provider identity",
                            identity.email
                        );
                        *identity = candidate;
                    }
                }),
            )
            .await
            .ok_or_else(|| AuthError::internal("identity vanished after insert"))?;

        let session = self
            .issue(&identity.email, Some(identity.user_id.clone()))
            .await;

        Ok(IssuedSession {
            session,
            profile: Some(identity.profile()),
        })
    }

    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.sessions
            .retain(Box::new(move |session: &Session| !session.is_expired(now)))
            .await
    }
}
