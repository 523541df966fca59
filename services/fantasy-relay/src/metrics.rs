//! Prometheus metrics exposition
//!
//! - `relay_requests_total` (counter): labels `route`, `status`
//! - `relay_request_duration_seconds` (histogram): label `route`
//! - `relay_upstream_errors_total` (counter): label `kind`
//! - `relay_token_exchanges_total` (counter): label `outcome`

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// In-process counters surfaced on `/health`.
#[derive(Debug, Clone)]
pub struct RelayMetrics {
    pub requests_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

fn builder() -> PrometheusBuilder {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("relay_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )
        .expect("histogram buckets are non-empty")
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> PrometheusHandle {
    builder()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Handle backed by a recorder that is never installed globally.
#[cfg(test)]
pub fn isolated_handle() -> PrometheusHandle {
    builder().build_recorder().handle()
}

pub fn record_request(route: &'static str, status: u16, duration_secs: f64) {
    metrics::counter!("relay_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route).record(duration_secs);
}

pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("relay_upstream_errors_total", "kind" => kind).increment(1);
}

/// `outcome` is one of `granted`, `rejected`, `failed`.
pub fn record_token_exchange(outcome: &'static str) {
    metrics::counter!("relay_token_exchanges_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_request("scoreboard", 200, 0.02);
        record_upstream_error("upstream_status");
        record_token_exchange("granted");
    }

    #[test]
    fn recorded_counters_render() {
        let recorder = builder().build_recorder();
        let handle = recorder.handle();

        let _guard = metrics::set_default_local_recorder(&recorder);

        record_request("scoreboard", 500, 0.1);
        record_upstream_error("upstream_status");
        record_token_exchange("rejected");

        let output = handle.render();
        assert!(output.contains("relay_requests_total"), "got: {output}");
        assert!(output.contains(r#"route="scoreboard""#));
        assert!(output.contains(r#"status="500""#));
        assert!(output.contains(r#"kind="upstream_status""#));
        assert!(output.contains(r#"outcome="rejected""#));
        assert!(output.contains("relay_request_duration_seconds_bucket"));
    }

    #[test]
    fn relay_metrics_start_at_zero() {
        let m = RelayMetrics::new();
        assert_eq!(m.requests_total.load(std::sync::atomic::Ordering::Relaxed), 0);
    }
}
