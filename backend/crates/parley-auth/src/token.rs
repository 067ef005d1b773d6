//! Random credential material. Both generators draw from the thread-local
//! CSPRNG.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// 256 bits
pub const SESSION_TOKEN_BYTES: usize = 32;

const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;

/// Opaque URL-safe bearer token
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill(&mut bytes[..]);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Uniform six-digit code, never zero-padded
pub fn generate_otp_code() -> String {
    rand::rng().random_range(OTP_MIN..=OTP_MAX).to_string()
}
