//! Prometheus metrics for monitoring the accounts service.
//!
//! When enabled, metrics are exported in Prometheus text format on a separate
//! listener. Without an installed exporter every recording call is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Auth Metrics**: Login attempts, registrations, token refreshes
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ua_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/auth/login", 200);
//! ```

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::logging;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Errors
///
/// Returns a description of the failure if the exporter cannot be installed
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Middleware recording count and latency per matched route
///
/// Must be installed with `route_layer` so the route template is known;
/// labelling by template keeps `/users/{id}` a single series.
pub async fn track_http(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    http_requests_total(&method, &path, status);
    http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);
    logging::log_api_request(&method, &path, status, elapsed.as_millis() as u64);

    response
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment successful registrations counter.
pub fn registrations_total() {
    metrics::counter!("registrations_total").increment(1);
}

/// Increment token refresh counter.
pub fn token_refreshes_total(success: bool) {
    metrics::counter!("token_refreshes_total",
        "success" => success.to_string()
    )
    .increment(1);
}
