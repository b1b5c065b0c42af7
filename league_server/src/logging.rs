//! Structured logging configuration.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! also receives those records.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Install the global tracing subscriber
///
/// Log levels come from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a rejected or suspicious request
///
/// # Example
///
/// ```
/// use league_server::logging::log_security_event;
///
/// log_security_event("admin_key_rejected", Some("/api/v1/tournaments"), "Invalid admin key");
/// ```
pub fn log_security_event(event_type: &str, path: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        path = path,
        "SECURITY: {}",
        message
    );
}

/// Log a completed API request, escalating slow ones to `warn`
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    if duration_ms > 1000 {
        tracing::warn!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "Slow API request"
        );
    } else {
        tracing::info!(
            request_id = request_id,
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        log_security_event("test_event", Some("/admin"), "Test message");
        log_security_event("test_event", None, "No path");
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("req-1", "GET", "/api/v1/teams", 200, 45);
        log_api_request("req-2", "POST", "/api/v1/tournaments/1/apply", 201, 1500);
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
