use crate::{ApiError, Result as ServerErrorResult, ShutdownCoordinator};

use parley_auth::{
    GoogleIdentityProvider, IdentityProvider, LogNotifier, OtpAuthenticator, OtpNotifier,
    OtpThrottle, Registrar, SessionManager, WebhookNotifier,
};
use parley_config::{Config, UploadConfig};
use parley_core::{Clock, IdentityStore, InMemoryStore, OtpStore, SessionStore, SystemClock};
use parley_relay::{CompletionProvider, ModelRouter, OpenRouterProvider, Relay, RelaySettings};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

/// Collaborators that talk to the outside world. Swapped out in tests.
pub struct Services {
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn OtpNotifier>,
    pub completions: Arc<dyn CompletionProvider>,
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub upload_dir: PathBuf,
    pub prometheus: Option<PrometheusHandle>,
}

impl Services {
    /// Production wiring
    pub fn from_config(config: &Config) -> ServerErrorResult<Self> {
        let notifier: Arc<dyn OtpNotifier> = match config.notifier.webhook_url {
            Some(ref url) => {
                log::info!("OTP delivery via webhook {url}");
                Arc::new(WebhookNotifier::new(url, &config.notifier.sender)?)
            }
            None => {
                log::warn!("No notifier webhook configured, OTP codes will be written to the log");
                Arc::new(LogNotifier)
            }
        };

        let completions = Arc::new(OpenRouterProvider::new(
            config.upstream.completions_url(),
            config.upstream.api_key.clone(),
            &config.upstream.referer,
            Duration::from_secs(config.upstream.connect_timeout_secs),
        )?);

        let identity_provider: Option<Arc<dyn IdentityProvider>> = match (
            &config.oauth.google_client_id,
            &config.oauth.google_client_secret,
        ) {
            (Some(id), Some(secret)) if config.oauth.is_enabled() => {
                log::info!("Google sign-in enabled");
                Some(Arc::new(GoogleIdentityProvider::new(
                    id.clone(),
                    secret.clone(),
                    config.oauth.authorize_endpoint.clone(),
                    config.oauth.token_endpoint.clone(),
                )?))
            }
            _ => None,
        };

        Ok(Self {
            clock: Arc::new(SystemClock),
            notifier,
            completions,
            identity_provider,
            upload_dir: config.uploads_path()?,
            prometheus: None,
        })
    }
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub identities: IdentityStore,
    pub otp_store: OtpStore,
    pub session_store: SessionStore,
    pub otp: Arc<OtpAuthenticator>,
    pub sessions: Arc<SessionManager>,
    pub registrar: Arc<Registrar>,
    pub relay: Arc<Relay>,
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
    pub upload_dir: PathBuf,
    pub upload_config: UploadConfig,
    pub app_url: String,
    pub development: bool,
    pub static_dir: Option<PathBuf>,
    pub shutdown: ShutdownCoordinator,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: &Config, services: Services) -> ServerErrorResult<Self> {
        let identities: IdentityStore = Arc::new(InMemoryStore::new());
        let otp_store: OtpStore = Arc::new(InMemoryStore::new());
        let session_store: SessionStore = Arc::new(InMemoryStore::new());

        let throttle = OtpThrottle::new(
            config.auth.otp_max_requests,
            Duration::from_secs(config.auth.otp_window_secs),
        );
        let otp = Arc::new(OtpAuthenticator::new(
            Arc::clone(&otp_store),
            services.notifier,
            throttle,
            Arc::clone(&services.clock),
            chrono::Duration::seconds(config.auth.otp_ttl_secs as i64),
        ));
        let sessions = Arc::new(SessionManager::new(
            Arc::clone(&session_store),
            Arc::clone(&identities),
            Arc::clone(&services.clock),
            chrono::Duration::seconds(config.auth.session_ttl_secs as i64),
        ));
        let registrar = Arc::new(Registrar::new(
            Arc::clone(&identities),
            Arc::clone(&otp),
            Arc::clone(&sessions),
            Arc::clone(&services.clock),
            config.auth.min_password_length,
        ));

        let relay = Arc::new(Relay::new(
            services.completions,
            ModelRouter::new(
                &config.upstream.coding_model,
                &config.upstream.general_model,
            ),
            RelaySettings {
                temperature: config.upstream.temperature,
                top_p: config.upstream.top_p,
                max_tokens: config.upstream.max_tokens,
            },
        ));

        std::fs::create_dir_all(&services.upload_dir).map_err(|e| {
            crate::ServerError::io(
                format!("creating upload dir {}", services.upload_dir.display()),
                e,
            )
        })?;

        Ok(Self {
            identities,
            otp_store,
            session_store,
            otp,
            sessions,
            registrar,
            relay,
            identity_provider: services.identity_provider,
            upload_dir: services.upload_dir,
            upload_config: config.uploads.clone(),
            app_url: config.app_url(),
            development: config.server.development,
            static_dir: config.server.static_dir.as_ref().map(PathBuf::from),
            shutdown: ShutdownCoordinator::new(),
            prometheus: services.prometheus,
        })
    }

    /// Convert a failure into its HTTP form, keeping internal details only
    /// in development mode
    #[track_caller]
    pub fn reject<E: Into<ApiError>>(&self, error: E) -> ApiError {
        let error = error.into();
        if self.development {
            error
        } else {
            error.without_details()
        }
    }

    /// Redirect target registered with the identity provider
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/api/auth/google/callback", self.app_url)
    }
}
