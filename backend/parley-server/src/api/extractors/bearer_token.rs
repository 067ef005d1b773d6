//! Optional `Authorization: Bearer` credential

use std::convert::Infallible;
use std::future::Future;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

const BEARER_PREFIX: &str = "Bearer ";

/// The bearer token, if the request carried one. Never rejects; the
/// session check decides what a missing token means.
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let token = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix(BEARER_PREFIX))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from);

            if parts.headers.contains_key(AUTHORIZATION) && token.is_none() {
                log::warn!("Ignoring Authorization header without a bearer token");
            }

            Ok(BearerToken(token))
        }
    }
}
