//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, and response compression.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
///
/// Also bounds how long a request waits on the KMS: the core performs no
/// retries or timeouts of its own.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
