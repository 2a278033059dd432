//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Every failure a seal or open request can hit maps onto exactly one of
/// these kinds; nothing is swallowed and nothing is retried. Variants map to
/// HTTP status codes returned to callers:
/// - [`ServiceError::Validation`] → 400
/// - [`ServiceError::Decode`] → 400
/// - [`ServiceError::Unauthorized`] → 403
/// - [`ServiceError::Integrity`] → 500
/// - [`ServiceError::EncryptionFailed`] → 500
/// - [`ServiceError::DecryptionFailed`] → 500
///
/// KMS-boundary failures deliberately carry no detail: callers must not be
/// able to distinguish "wrong key" from "tampered ciphertext". The underlying
/// cause is logged server-side instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed before any external call was made.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The caller-supplied header text could not be decoded.
    #[error("malformed header: {0}")]
    Decode(String),

    /// The KMS accepted the ciphertext but the recovered plaintext is not a
    /// well-formed envelope — tamper or version skew.
    #[error("sealed envelope failed integrity checks")]
    Integrity,

    /// The KMS encrypt call failed: permission denied, key disabled, unreachable.
    #[error("encryption failed")]
    EncryptionFailed,

    /// The KMS decrypt call failed: wrong key, revoked key, corrupted ciphertext.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The caller is not in the envelope's authorized-user list.
    #[error("caller is not authorized for this envelope")]
    Unauthorized,
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Decode(_) => 400,
            ServiceError::Unauthorized => 403,
            ServiceError::Integrity => 500,
            ServiceError::EncryptionFailed => 500,
            ServiceError::DecryptionFailed => 500,
        }
    }

    /// Short machine-readable error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Decode(_) => "decode_failure",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Integrity => "integrity_failure",
            ServiceError::EncryptionFailed => "encryption_failed",
            ServiceError::DecryptionFailed => "decryption_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::Validation("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Decode("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Unauthorized.http_status(), 403);
        assert_eq!(ServiceError::Integrity.http_status(), 500);
        assert_eq!(ServiceError::EncryptionFailed.http_status(), 500);
        assert_eq!(ServiceError::DecryptionFailed.http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::Validation("dek is not valid base64".into());
        assert!(e.to_string().contains("dek is not valid base64"));
    }

    #[test]
    fn kms_failures_carry_no_detail() {
        // The Display text must stay generic for both KMS-boundary kinds.
        assert_eq!(ServiceError::EncryptionFailed.to_string(), "encryption failed");
        assert_eq!(ServiceError::DecryptionFailed.to_string(), "decryption failed");
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            ServiceError::Validation("x".into()).code(),
            ServiceError::Decode("x".into()).code(),
            ServiceError::Unauthorized.code(),
            ServiceError::Integrity.code(),
            ServiceError::EncryptionFailed.code(),
            ServiceError::DecryptionFailed.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
