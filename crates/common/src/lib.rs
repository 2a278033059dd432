//! Common types, protocol definitions, and errors shared across `envelope-seal-svc` crates.

pub mod envelope;
pub mod error;
pub mod protocol;

pub use envelope::{Dek, Envelope};
pub use error::ServiceError;
