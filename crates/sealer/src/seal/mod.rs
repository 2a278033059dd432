//! Envelope sealing and opening around the KMS boundary.
//!
//! [`service::EnvelopeCipher`] orchestrates the two protocol flows;
//! [`authz`] holds the gate that runs between envelope decode and key
//! release on open.

pub mod authz;
pub mod service;

pub use service::EnvelopeCipher;
