#![allow(dead_code)]

//! Test infrastructure for parley-server API tests

use parley_auth::{
    AuthError, IdentityProvider, OtpMessage, OtpNotifier, Result as AuthErrorResult,
};
use parley_config::Config;
use parley_core::ManualClock;
use parley_relay::OpenRouterProvider;
use parley_server::{AppState, Services};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

pub const CODING_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const GENERAL_MODEL: &str = "google/gemini-2.0-flash-001";

/// Captures every code instead of emailing it
#[derive(Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<OtpMessage>>,
    failing: AtomicBool,
}

impl CapturingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == email)
            .map(|m| m.code.clone())
    }

    pub fn sent(&self) -> Vec<OtpMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl OtpNotifier for CapturingNotifier {
    async fn deliver(&self, message: &OtpMessage) -> AuthErrorResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::delivery_failed("mail relay returned 502"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub notifier: Arc<CapturingNotifier>,
    pub clock: Arc<ManualClock>,
    pub upstream: MockServer,
    pub upload_dir: TempDir,
}

pub struct TestAppBuilder {
    config: Config,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl TestAppBuilder {
    pub fn development(mut self, development: bool) -> Self {
        self.config.server.development = development;
        self
    }

    pub fn with_config(mut self, edit: impl FnOnce(&mut Config)) -> Self {
        edit(&mut self.config);
        self
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    pub async fn build(self) -> TestApp {
        let upstream = MockServer::start().await;
        let upload_dir = TempDir::new().unwrap();
        let notifier = Arc::new(CapturingNotifier::default());
        let clock = Arc::new(ManualClock::starting_now());

        let mut config = self.config;
        config.upstream.coding_model = CODING_MODEL.to_string();
        config.upstream.general_model = GENERAL_MODEL.to_string();

        let completions = OpenRouterProvider::new(
            format!("{}/api/v1/chat/completions", upstream.uri()),
            Some("sk-test".to_string()),
            "http://localhost:3000",
            Duration::from_secs(5),
        )
        .unwrap();

        let services = Services {
            clock: clock.clone(),
            notifier: notifier.clone(),
            completions: Arc::new(completions),
            identity_provider: self.identity_provider,
            upload_dir: upload_dir.path().to_path_buf(),
            prometheus: None,
        };

        let state = AppState::new(&config, services).unwrap();

        TestApp {
            state,
            notifier,
            clock,
            upstream,
            upload_dir,
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        let mut config = Config::default();
        config.server.development = true;
        TestAppBuilder {
            config,
            identity_provider: None,
        }
    }

    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn router(&self) -> Router {
        parley_server::build_router(self.state.clone())
    }

    /// A live session for `email` without going through OTP
    pub async fn session_token(&self, email: &str) -> String {
        self.state.sessions.issue(email, None).await.token
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_json(request).await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send_json(request).await
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = self.send(request).await;
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).unwrap()
        };
        (status, json)
    }

    /// Status, headers and the whole body as text
    pub async fn send(
        &self,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    /// Register and verify an account through the API
    pub async fn verified_account(&self, username: &str, email: &str, password: &str) {
        let (status, _) = self
            .post_json(
                "/api/register",
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                    "displayName": username,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self.notifier.last_code_for(email).unwrap();
        let (status, _) = self
            .post_json(
                "/api/verify-otp",
                serde_json::json!({"email": email, "otp": code}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Upstream completion body in OpenAI streaming form
pub fn upstream_frames(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = serde_json::json!({"choices": [{"delta": {"content": fragment}}]});
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
