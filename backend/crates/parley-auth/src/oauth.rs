use crate::{AuthError, IdTokenDecoder, Result as AuthErrorResult};

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const GOOGLE_SCOPE: &str = "openid email profile";

/// Identity asserted by an external provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to in order to sign in
    fn authorize_url(&self, redirect_uri: &str) -> String;

    /// Trade an authorization code for the identity it proves
    async fn exchange(&self, code: &str, redirect_uri: &str) -> AuthErrorResult<ProviderIdentity>;
}

pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    authorize_endpoint: String,
    token_endpoint: String,
    decoder: IdTokenDecoder,
}

#[derive(Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        authorize_endpoint: String,
        token_endpoint: String,
    ) -> AuthErrorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| AuthError::internal(format!("oauth client: {e}")))?;
        let decoder = IdTokenDecoder::new(&client_id);

        Ok(Self {
            client,
            client_id,
            client_secret,
            authorize_endpoint,
            token_endpoint,
            decoder,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorize_url(&self, redirect_uri: &str) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", GOOGLE_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];

        match reqwest::Url::parse_with_params(&self.authorize_endpoint, &params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::error!("Invalid authorize endpoint {}: {e}", self.authorize_endpoint);
                self.authorize_endpoint.clone()
            }
        }
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> AuthErrorResult<ProviderIdentity> {
        let form = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::provider(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::provider(format!("token response unreadable: {e}")))?;

        let id_token = body
            .id_token
            .ok_or_else(|| AuthError::provider("token response has no id_token"))?;
        let claims = self.decoder.decode(&id_token)?;

        Ok(ProviderIdentity {
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        })
    }
}
