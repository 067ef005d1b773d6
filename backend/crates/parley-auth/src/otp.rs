use crate::{
    AuthError, OtpMessage, OtpNotifier, OtpPurpose, OtpThrottle, Result as AuthErrorResult,
    token::generate_otp_code,
};

use parley_core::validation::validate_email;
use parley_core::{Clock, OtpStore, PendingOtp};

use std::sync::Arc;

use chrono::Duration;
use metrics::counter;
use subtle::ConstantTimeEq;

/// Issues and checks one-time codes, one live code per email
pub struct OtpAuthenticator {
    store: OtpStore,
    notifier: Arc<dyn OtpNotifier>,
    throttle: OtpThrottle,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl OtpAuthenticator {
    pub fn new(
        store: OtpStore,
        notifier: Arc<dyn OtpNotifier>,
        throttle: OtpThrottle,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            throttle,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate, store and deliver a fresh code, replacing any previous one.
    ///
    /// If delivery fails the record stays in place; issuing again replaces it.
    pub async fn issue(&self, email: &str, purpose: OtpPurpose) -> AuthErrorResult<PendingOtp> {
        validate_email(email)?;
        self.throttle.check(email)?;

        let pending = PendingOtp::new(
            email.to_string(),
            generate_otp_code(),
            self.clock.now(),
            self.ttl,
        );
        self.store.put(email.to_string(), pending.clone()).await;

        let message = OtpMessage::new(
            email,
            &pending.code,
            pending.expires_in_secs(),
            purpose,
        );
        if let Err(e) = self.notifier.deliver(&message).await {
            counter!("parley_otp_delivery_failed_total").increment(1);
            log::error!("OTP delivery to {email} failed: {e}");
            return Err(match e {
                AuthError::DeliveryFailed { .. } => e,
                other => AuthError::delivery_failed(other.to_string()),
            });
        }

        counter!("parley_otp_issued_total").increment(1);
        log::info!("Issued {purpose:?} OTP for {email}");
        Ok(pending)
    }

    /// Consume the pending code for `email`. Succeeds at most once per issued code.
    ///
    /// A wrong code leaves the record in place.
    pub async fn verify(&self, email: &str, code: &str) -> AuthErrorResult<()> {
        let key = email.to_string();

        let Some(pending) = self.store.get(&key).await else {
            counter!("parley_otp_failed_total", "reason" => "not_found").increment(1);
            return Err(AuthError::otp_not_found());
        };

        if pending.is_expired(self.clock.now()) {
            self.store.delete(&key).await;
            counter!("parley_otp_failed_total", "reason" => "expired").increment(1);
            return Err(AuthError::otp_expired());
        }

        if !bool::from(pending.code.as_bytes().ct_eq(code.as_bytes())) {
            counter!("parley_otp_failed_total", "reason" => "mismatch").increment(1);
            return Err(AuthError::otp_mismatch());
        }

        // Claim exactly the record we checked; a concurrent verify or re-issue wins otherwise.
        let issued_at = pending.issued_at;
        let expected = pending.code;
        let claimed = self
            .store
            .remove_if(
                &key,
                Box::new(move |current: &PendingOtp| {
                    current.issued_at == issued_at && current.code == expected
                }),
            )
            .await;

        if claimed.is_none() {
            counter!("parley_otp_failed_total", "reason" => "not_found").increment(1);
            return Err(AuthError::otp_not_found());
        }

        counter!("parley_otp_verified_total").increment(1);
        Ok(())
    }

    /// Whether an unexpired code is pending for `email`
    pub async fn has_live_code(&self, email: &str) -> bool {
        let now = self.clock.now();
        self.store
            .get(&email.to_string())
            .await
            .is_some_and(|pending| !pending.is_expired(now))
    }

    pub async fn purge_expired(&self) -> usize {
        self.throttle.shrink();
        let now = self.clock.now();
        self.store
            .retain(Box::new(move |pending: &PendingOtp| !pending.is_expired(now)))
            .await
    }
}
