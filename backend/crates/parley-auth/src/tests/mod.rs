mod token;

use crate::{
    AuthError, OtpAuthenticator, OtpMessage, OtpNotifier, OtpThrottle, Registrar,
    RegistrationRequest, Result as AuthErrorResult, SessionManager,
};

use parley_core::{
    Clock, IdentityStore, InMemoryStore, ManualClock, OtpStore, SessionStore,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;

pub(crate) const TEST_EMAIL: &str = "ada@example.com";
pub(crate) const TEST_PASSWORD: &str = "correct-horse";

/// Keeps every delivered message; can be switched to fail deliveries
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<OtpMessage>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == email)
            .map(|m| m.code.clone())
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn deliver(&self, message: &OtpMessage) -> AuthErrorResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::delivery_failed("mail relay down"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub(crate) struct Harness {
    pub clock: ManualClock,
    pub notifier: Arc<RecordingNotifier>,
    pub identities: IdentityStore,
    pub otps: OtpStore,
    pub session_store: SessionStore,
    pub otp: Arc<OtpAuthenticator>,
    pub sessions: Arc<SessionManager>,
    pub registrar: Registrar,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_throttle(1000, StdDuration::from_secs(60))
    }

    pub(crate) fn with_throttle(max_requests: u32, window: StdDuration) -> Self {
        let clock = ManualClock::starting_now();
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let notifier = Arc::new(RecordingNotifier::default());
        let identities: IdentityStore = Arc::new(InMemoryStore::new());
        let otps: OtpStore = Arc::new(InMemoryStore::new());
        let session_store: SessionStore = Arc::new(InMemoryStore::new());

        let otp = Arc::new(OtpAuthenticator::new(
            otps.clone(),
            notifier.clone(),
            OtpThrottle::new(max_requests, window),
            shared_clock.clone(),
            Duration::minutes(10),
        ));
        let sessions = Arc::new(SessionManager::new(
            session_store.clone(),
            identities.clone(),
            shared_clock.clone(),
            Duration::hours(24),
        ));
        let registrar = Registrar::new(
            identities.clone(),
            otp.clone(),
            sessions.clone(),
            shared_clock,
            8,
        );

        Self {
            clock,
            notifier,
            identities,
            otps,
            session_store,
            otp,
            sessions,
            registrar,
        }
    }

    /// Register and verify `email`, leaving a verified identity behind
    pub(crate) async fn verified_user(&self, username: &str, email: &str) {
        self.registrar
            .register(registration(username, email, TEST_PASSWORD))
            .await
            .unwrap();
        let code = self.notifier.last_code_for(email).unwrap();
        self.registrar
            .complete_verification(email, &code)
            .await
            .unwrap();
    }
}

pub(crate) fn registration(username: &str, email: &str, password: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        display_name: "Ada Lovelace".to_string(),
        profile_photo: None,
    }
}

/// Compact JWT with a placeholder signature
pub(crate) fn unsigned_jwt(claims: serde_json::Value) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub(crate) fn google_claims(client_id: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "iss": "https://accounts.google.com",
        "aud": client_id,
        "email": email,
        "email_verified": true,
        "name": "Grace Hopper",
        "picture": "https://example.com/grace.png",
        "exp": chrono::Utc::now().timestamp() + 3600,
    })
}
