//! HTTP server for the user accounts service.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
