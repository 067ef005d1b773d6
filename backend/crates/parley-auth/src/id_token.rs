use crate::{AuthError, Result as AuthErrorResult};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub email: String,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub exp: i64,
}

/// Reads the claims of an id_token received directly from the provider's
/// token endpoint.
///
/// The token arrived over TLS from the endpoint itself, so the signature is
/// not checked; audience, issuer and expiry still are.
pub struct IdTokenDecoder {
    validation: Validation,
}

impl IdTokenDecoder {
    pub fn new(client_id: &str) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.set_audience(&[client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.validate_exp = true;
        validation.leeway = 30;

        Self { validation }
    }

    #[track_caller]
    pub fn decode(&self, id_token: &str) -> AuthErrorResult<IdTokenClaims> {
        let data = decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(&[]), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::provider("id_token expired"),
                ErrorKind::InvalidAudience => AuthError::provider("id_token audience mismatch"),
                ErrorKind::InvalidIssuer => AuthError::provider("id_token issuer mismatch"),
                _ => AuthError::provider(format!("id_token could not be decoded: {e}")),
            })?;

        let claims = data.claims;
        if claims.email_verified == Some(false) {
            return Err(AuthError::provider("provider email is not verified"));
        }
        if claims.email.trim().is_empty() {
            return Err(AuthError::provider("id_token has no email"));
        }

        Ok(claims)
    }
}
