//! Middleware for observability and abuse control.
//!
//! This module provides:
//! - Request logging with latency tracking
//! - Attempt throttling for the credential endpoints

pub mod logging;
pub mod throttle;

pub use logging::request_logging;
pub use throttle::{throttle_middleware, LoginThrottle};
