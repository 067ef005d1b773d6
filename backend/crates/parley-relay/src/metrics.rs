use crate::RelayState;

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Counters for the streaming relay
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            prefix: "parley_relay",
        }
    }

    pub fn stream_started(&self, model: &str) {
        counter!(format!("{}_streams_started_total", self.prefix), "model" => model.to_string())
            .increment(1);
        gauge!(format!("{}_streams_active", self.prefix)).increment(1.0);
    }

    pub fn fragment_forwarded(&self) {
        counter!(format!("{}_fragments_forwarded_total", self.prefix)).increment(1);
    }

    /// Record how a stream ended
    pub fn stream_finished(&self, state: RelayState, elapsed: Duration) {
        counter!(format!("{}_streams_finished_total", self.prefix), "outcome" => state.label())
            .increment(1);
        gauge!(format!("{}_streams_active", self.prefix)).decrement(1.0);
        histogram!(format!("{}_stream_duration_seconds", self.prefix))
            .record(elapsed.as_secs_f64());
    }

    pub fn upstream_error(&self, kind: &'static str) {
        counter!(format!("{}_upstream_errors_total", self.prefix), "kind" => kind).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
