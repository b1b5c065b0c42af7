//! HTTP server for the league backend.
//!
//! - [`api`]: axum router, handlers and middleware
//! - [`config`]: environment-driven configuration
//! - [`logging`]: tracing subscriber setup and structured log helpers
//! - [`metrics`]: Prometheus metrics
//! - [`scheduler`]: periodic auto-close of full tournaments

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod scheduler;
