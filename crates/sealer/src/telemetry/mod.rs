//! Telemetry setup: structured logs plus optional OTLP trace export.
//!
//! # Telemetry invariants
//!
//! - **No key material or caller identities** must appear in any span
//!   attribute or log field — counts and classified error codes only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
