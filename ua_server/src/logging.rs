//! Structured logging configuration.
//!
//! Library crates log through the `log` facade; `tracing-subscriber` picks
//! those records up alongside native `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use ua_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
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

/// Log security event with structured data
///
/// # Arguments
///
/// * `event_type` - Type of security event
/// * `user_id` - Optional user ID
/// * `message` - Event message
///
/// # Example
///
/// ```
/// use ua_server::logging::log_security_event;
///
/// log_security_event("forbidden", Some(123), "Role change attempted by non-admin");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<i64>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        "SECURITY: {}",
        message
    );
}

/// Log API request/response
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Matched route
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    tracing::info!(
        http_method = method,
        http_path = path,
        http_status = status_code,
        duration_ms = duration_ms,
        "API request completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("failed_login", None, "Invalid credentials");
        log_security_event("forbidden", Some(1), "Test message");
    }

    #[test]
    fn test_log_api_request() {
        log_api_request("GET", "/api/v1/users", 200, 45);
        log_api_request("POST", "/api/v1/auth/login", 401, 120);
    }
}
