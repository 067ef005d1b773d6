use crate::{AuthError, Result as AuthErrorResult};

use std::num::NonZeroU32;
use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

/// Per-email limit on OTP issuance
pub struct OtpThrottle {
    limiter: DefaultKeyedRateLimiter<String>,
    max_requests: u32,
    window: Duration,
}

impl OtpThrottle {
    /// Allows a burst of `max_requests`, refilling evenly over `window`
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let period = (window / burst.get()).max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
            max_requests: burst.get(),
            window,
        }
    }

    #[track_caller]
    pub fn check(&self, email: &str) -> AuthErrorResult<()> {
        self.limiter
            .check_key(&email.to_owned())
            .map_err(|_| AuthError::RateLimited {
                limit: self.max_requests,
                window_secs: self.window.as_secs(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Drop state for keys whose quota has fully refilled
    pub fn shrink(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}
