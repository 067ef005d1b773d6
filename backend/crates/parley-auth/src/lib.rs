pub mod error;
pub mod id_token;
pub mod issued_session;
pub mod notifier;
pub mod oauth;
pub mod otp;
pub mod password;
pub mod registration;
pub mod session;
pub mod throttle;
pub mod token;

pub use error::{AuthError, Result};
pub use id_token::{IdTokenClaims, IdTokenDecoder};
pub use issued_session::IssuedSession;
pub use notifier::{LogNotifier, OtpMessage, OtpNotifier, OtpPurpose, WebhookNotifier};
pub use oauth::{GoogleIdentityProvider, IdentityProvider, ProviderIdentity};
pub use otp::OtpAuthenticator;
pub use registration::{PendingRegistration, RegistrationRequest, Registrar};
pub use session::SessionManager;
pub use throttle::OtpThrottle;

#[cfg(test)]
mod tests;
