//! Google sign-in redirect flow

use crate::{ApiError, ApiResult, AppState};

use parley_auth::IdentityProvider;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

fn provider(state: &AppState) -> ApiResult<Arc<dyn IdentityProvider>> {
    state
        .identity_provider
        .clone()
        .ok_or_else(|| ApiError::not_found("Google sign-in is not configured"))
}

/// GET /api/auth/google
pub async fn google_start(State(state): State<AppState>) -> ApiResult<Redirect> {
    let provider = provider(&state)?;
    Ok(Redirect::to(
        &provider.authorize_url(&state.oauth_redirect_uri()),
    ))
}

/// GET /api/auth/google/callback?code=..
///
/// Ends in a redirect to the app carrying the new session token.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    let provider = provider(&state)?;

    let code = match query.code {
        Some(code) if !code.trim().is_empty() => code,
        _ => return Err(ApiError::bad_request("Missing code")),
    };

    let issued = state
        .sessions
        .oauth_exchange(provider.as_ref(), &code, &state.oauth_redirect_uri())
        .await
        .map_err(|e| state.reject(e))?;

    log::info!("Google sign-in for {}", issued.session.email);
    Ok(Redirect::to(&format!(
        "{}?sessionToken={}",
        state.app_url, issued.session.token
    )))
}
