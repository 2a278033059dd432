//! [`EnvelopeCipher`]: the seal/open protocol around the KMS boundary.
//!
//! Seal: validate → canonical encode → `KMS.encrypt` → base64 header.
//! Open: decode header → `KMS.decrypt` → canonical decode → authorize →
//! release.
//!
//! Every call is an independent, stateless operation; the KMS round-trip is
//! the only suspension point and is awaited without any cross-request lock.
//! A failed stage aborts the whole request — no partial result ever escapes.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::{Dek, Envelope, ServiceError};
use tracing::warn;

use super::authz::authorize;
use crate::kms::KmsClient;

/// Seals and opens envelopes with an injected KMS capability.
#[derive(Clone)]
pub struct EnvelopeCipher {
    kms: Arc<dyn KmsClient>,
    key_id: String,
}

impl EnvelopeCipher {
    /// Create a cipher bound to one KMS capability and key identifier.
    pub fn new(kms: Arc<dyn KmsClient>, key_id: impl Into<String>) -> Self {
        Self {
            kms,
            key_id: key_id.into(),
        }
    }

    /// Seal an envelope into an opaque header string.
    ///
    /// Exactly one outbound KMS call occurs; a KMS failure is fatal to the
    /// request and is not retried here.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for an empty `dek` or `iv` and
    /// [`ServiceError::EncryptionFailed`] when the KMS call fails.
    pub async fn seal(&self, envelope: &Envelope) -> Result<String, ServiceError> {
        if envelope.dek.is_empty() {
            return Err(ServiceError::Validation("dek must not be empty".into()));
        }
        if envelope.iv.is_empty() {
            return Err(ServiceError::Validation("iv must not be empty".into()));
        }
        if envelope.authorized_users.is_empty() {
            // Deny-all policy: this header will never be openable.
            warn!("sealing envelope with no authorized users");
        }

        let plaintext = envelope.encode();
        let ciphertext = self
            .kms
            .encrypt(&self.key_id, &plaintext)
            .await
            .map_err(|e| {
                warn!(error = %e, "kms encrypt failed");
                ServiceError::EncryptionFailed
            })?;

        Ok(URL_SAFE_NO_PAD.encode(ciphertext))
    }

    /// Open a sealed header for `caller`, releasing key material only after
    /// the authorization check passes.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Decode`] for malformed header text,
    /// [`ServiceError::DecryptionFailed`] when the KMS rejects the
    /// ciphertext, [`ServiceError::Integrity`] when the recovered plaintext
    /// is not a well-formed envelope, and [`ServiceError::Unauthorized`]
    /// when the caller is not in the envelope's user list.
    pub async fn open(&self, header: &str, caller: &str) -> Result<Dek, ServiceError> {
        let ciphertext = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| ServiceError::Decode("header is not valid base64".into()))?;

        let plaintext = self
            .kms
            .decrypt(&self.key_id, &ciphertext)
            .await
            .map_err(|e| {
                warn!(error = %e, "kms decrypt failed");
                ServiceError::DecryptionFailed
            })?;

        let envelope = Envelope::decode(&plaintext).map_err(|e| {
            warn!(error = %e, "recovered plaintext is not a valid envelope");
            ServiceError::Integrity
        })?;

        authorize(caller, &envelope.authorized_users)?;

        Ok(Dek {
            dek: envelope.dek,
            iv: envelope.iv,
        })
    }
}
