//! Input grammar checks shared by the auth services and the HTTP layer.

use crate::{CoreError, Result as CoreErrorResult};

use std::sync::LazyLock;

use regex::Regex;

/// Shortest accepted password, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_USERNAME_LENGTH: usize = 64;
pub const OTP_LENGTH: usize = 6;

// local-part @ domain-with-a-dot, no whitespace anywhere
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("username pattern compiles"));

#[track_caller]
pub fn validate_required(value: &str, field: &'static str) -> CoreErrorResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, format!("{field} is required")));
    }
    Ok(())
}

#[track_caller]
pub fn validate_email(email: &str) -> CoreErrorResult<()> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(CoreError::validation("email", "Email address is not valid"));
    }
    Ok(())
}

#[track_caller]
pub fn validate_username(username: &str) -> CoreErrorResult<()> {
    validate_required(username, "username")?;

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::validation(
            "username",
            format!("Username must not exceed {MAX_USERNAME_LENGTH} characters"),
        ));
    }

    if !USERNAME_PATTERN.is_match(username) {
        return Err(CoreError::validation(
            "username",
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

#[track_caller]
pub fn validate_password(password: &str, min_length: usize) -> CoreErrorResult<()> {
    if password.chars().count() < min_length {
        return Err(CoreError::validation(
            "password",
            format!("Password must be at least {min_length} characters"),
        ));
    }
    Ok(())
}

/// Six ASCII digits
#[track_caller]
pub fn validate_otp_shape(code: &str) -> CoreErrorResult<()> {
    if code.len() != OTP_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::validation(
            "otp",
            format!("OTP must be {OTP_LENGTH} digits"),
        ));
    }
    Ok(())
}
