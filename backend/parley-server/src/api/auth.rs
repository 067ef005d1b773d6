//! OTP, registration and password sign-in endpoints

use crate::{ApiError, ApiResult, AppState, api::extractors::api_json::ApiJson};

use parley_auth::{AuthError, OtpPurpose, RegistrationRequest};
use parley_core::api::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SendOtpRequest,
    SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use parley_core::validation::validate_otp_shape;

use axum::{Json, extract::State};

/// POST /api/send-otp
pub async fn send_otp(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendOtpRequest>,
) -> ApiResult<Json<SendOtpResponse>> {
    let email = request.email.trim();

    state
        .otp
        .issue(email, OtpPurpose::SignIn)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent to your email".to_string(),
        expires_in: state.otp.ttl().num_seconds(),
    }))
}

/// POST /api/verify-otp
///
/// Completes a registration when the email belongs to a pending identity,
/// otherwise acts as a plain OTP sign-in.
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyOtpRequest>,
) -> ApiResult<Json<VerifyOtpResponse>> {
    let email = request.email.trim();
    let otp = request.otp.trim();

    if email.is_empty() || otp.is_empty() {
        return Err(ApiError::bad_request("Email and OTP are required"));
    }
    validate_otp_shape(otp).map_err(|e| state.reject(AuthError::from(e)))?;

    let issued = state
        .registrar
        .complete_verification(email, otp)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(VerifyOtpResponse::new(
        issued.session.token,
        issued.session.email,
        issued.profile,
    )))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let pending = state
        .registrar
        .register(RegistrationRequest {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password: request.password,
            display_name: request.display_name.trim().to_string(),
            profile_photo: request.profile_photo.filter(|p| !p.trim().is_empty()),
        })
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(RegisterResponse {
        success: true,
        user_id: pending.user_id,
        email: pending.email,
    }))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let issued = state
        .sessions
        .login(email, &request.password)
        .await
        .map_err(|e| state.reject(e))?;

    let user = issued.profile.ok_or_else(|| {
        state.reject(AuthError::internal("login issued a session without a profile"))
    })?;

    Ok(Json(LoginResponse {
        success: true,
        session_token: issued.session.token,
        user,
    }))
}
