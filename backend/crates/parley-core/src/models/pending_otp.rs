use chrono::{DateTime, Duration, Utc};

/// One active code per email. Issuing again replaces the previous record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    pub owner_email: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    pub fn new(owner_email: String, code: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            owner_email,
            code,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// A code is still usable at exactly `expires_at`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn expires_in_secs(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}
