//! Periodic eviction of expired OTPs and sessions

use crate::ShutdownGuard;

use parley_auth::{OtpAuthenticator, SessionManager};

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

/// Evict expired records once. Returns `(otps, sessions)` removed.
pub async fn sweep_once(otp: &OtpAuthenticator, sessions: &SessionManager) -> (usize, usize) {
    let otps = otp.purge_expired().await;
    let expired_sessions = sessions.purge_expired().await;

    if otps + expired_sessions > 0 {
        log::debug!("Swept {otps} expired OTPs and {expired_sessions} expired sessions");
    }
    counter!("parley_swept_otps_total").increment(otps as u64);
    counter!("parley_swept_sessions_total").increment(expired_sessions as u64);

    (otps, expired_sessions)
}

/// Run `sweep_once` every `interval` until shutdown
pub fn spawn_sweeper(
    otp: Arc<OtpAuthenticator>,
    sessions: Arc<SessionManager>,
    interval: Duration,
    mut shutdown: ShutdownGuard,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // the first tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    log::info!("Sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    sweep_once(&otp, &sessions).await;
                }
            }
        }
    })
}
