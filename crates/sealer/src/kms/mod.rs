//! The KMS boundary: a capability trait plus its production backends.
//!
//! The service never derives, stores, or inspects key material itself; it
//! only marshals canonical envelope bytes across [`KmsClient`]. Two backends
//! implement the trait:
//!
//! - [`aws::AwsKms`] — AWS KMS Encrypt/Decrypt via the SDK.
//! - [`local::LocalKms`] — in-process AEAD keyed by named KEKs, for
//!   development and self-hosted deployments.

pub mod aws;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced at the KMS boundary.
///
/// These never reach callers directly — the cipher service collapses them
/// into the classified `EncryptionFailed`/`DecryptionFailed` kinds and logs
/// the detail server-side.
#[derive(Debug, Error)]
pub enum KmsError {
    /// The backend call failed: unreachable, permission denied, key disabled.
    #[error("kms backend failure: {0}")]
    Backend(String),

    /// No key with the given identifier is known to the backend.
    #[error("unknown key id: {0}")]
    UnknownKey(String),

    /// The backend rejected the ciphertext (authentication failure).
    #[error("ciphertext rejected")]
    Rejected,
}

/// Capability interface to the root-of-trust.
///
/// Exactly two operations, keyed by an opaque key identifier. The capability
/// is injected into the cipher service at construction, so tests can
/// substitute a deterministic fake or a generated mock for failure
/// injection. Implementations must be safe to share across concurrent
/// requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// Encrypt `plaintext` under the named key.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError>;

    /// Decrypt `ciphertext` under the named key.
    async fn decrypt(&self, key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError>;
}

/// Deterministic, reversible byte transform standing in for a real KMS in
/// unit tests. Unauthenticated on purpose — tamper-detection tests use
/// [`local::LocalKms`] instead.
#[cfg(test)]
pub(crate) struct FakeKms;

#[cfg(test)]
#[async_trait]
impl KmsClient for FakeKms {
    async fn encrypt(&self, _key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        Ok(plaintext.iter().map(|b| b ^ 0xa5).collect())
    }

    async fn decrypt(&self, _key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        Ok(ciphertext.iter().map(|b| b ^ 0xa5).collect())
    }
}
