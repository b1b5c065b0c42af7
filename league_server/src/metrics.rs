//! Prometheus metrics.
//!
//! When `METRICS_BIND` is set the exporter serves `http://<addr>/metrics`.
//! Without an installed exporter the recording calls are no-ops.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus exporter with its own HTTP listener
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Count one HTTP request
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Count a workflow outcome, labelled by operation and outcome code
pub fn tournament_outcomes_total(action: &'static str, code: &'static str) {
    metrics::counter!("tournament_outcomes_total",
        "action" => action,
        "code" => code
    )
    .increment(1);
}

/// Record one auto-close sweep
pub fn auto_close_sweep(closed: usize, failed: usize) {
    metrics::counter!("tournament_auto_close_runs_total").increment(1);
    metrics::counter!("tournaments_auto_closed_total").increment(closed as u64);
    metrics::counter!("tournament_auto_close_failures_total").increment(failed as u64);
}
