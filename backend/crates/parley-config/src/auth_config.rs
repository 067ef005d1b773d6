use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_MIN_PASSWORD_LENGTH,
    DEFAULT_OTP_MAX_REQUESTS, DEFAULT_OTP_TTL_SECS, DEFAULT_OTP_WINDOW_SECS,
    DEFAULT_SESSION_TTL_SECS, MAX_OTP_MAX_REQUESTS, MAX_OTP_WINDOW_SECS,
};

use serde::Deserialize;

/// OTP and session lifetimes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub otp_ttl_secs: u64,
    pub session_ttl_secs: u64,
    /// Codes that may be issued per email within `otp_window_secs`
    pub otp_max_requests: u32,
    pub otp_window_secs: u64,
    /// How often expired OTPs and sessions are swept
    pub cleanup_interval_secs: u64,
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            otp_max_requests: DEFAULT_OTP_MAX_REQUESTS,
            otp_window_secs: DEFAULT_OTP_WINDOW_SECS,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.otp_ttl_secs == 0 || self.session_ttl_secs == 0 {
            return Err(ConfigError::auth(
                "auth.otp_ttl_secs and auth.session_ttl_secs must be > 0",
            ));
        }

        if self.otp_max_requests == 0 || self.otp_max_requests > MAX_OTP_MAX_REQUESTS {
            return Err(ConfigError::auth(format!(
                "auth.otp_max_requests must be 1-{}, got {}",
                MAX_OTP_MAX_REQUESTS, self.otp_max_requests
            )));
        }

        if self.otp_window_secs == 0 || self.otp_window_secs > MAX_OTP_WINDOW_SECS {
            return Err(ConfigError::auth(format!(
                "auth.otp_window_secs must be 1-{}, got {}",
                MAX_OTP_WINDOW_SECS, self.otp_window_secs
            )));
        }

        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::auth("auth.cleanup_interval_secs must be > 0"));
        }

        if self.min_password_length == 0 {
            return Err(ConfigError::auth("auth.min_password_length must be > 0"));
        }

        Ok(())
    }
}
