//! Request and response types exchanged over the public HTTP API.
//!
//! These types are serialised as JSON. Byte fields (`dek`, `iv`) travel as
//! base64 URL-safe unpadded strings — the same alphabet used for sealed
//! headers — and are converted to and from the internal [`Envelope`] model
//! here. The canonical binary form never appears on this boundary.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::envelope::{Dek, Envelope};
use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Seal endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /seal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealRequest {
    /// Data-encryption key, base64 URL-safe unpadded.
    pub dek: String,
    /// Initialization vector, base64 URL-safe unpadded.
    pub iv: String,
    /// Identities permitted to open the envelope, in order.
    pub authorized_users: Vec<String>,
}

impl SealRequest {
    /// Convert the transport shape into the internal [`Envelope`] model.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] if either byte field is not
    /// valid base64.
    pub fn into_envelope(self) -> Result<Envelope, ServiceError> {
        let dek = URL_SAFE_NO_PAD
            .decode(&self.dek)
            .map_err(|_| ServiceError::Validation("dek is not valid base64".into()))?;
        let iv = URL_SAFE_NO_PAD
            .decode(&self.iv)
            .map_err(|_| ServiceError::Validation("iv is not valid base64".into()))?;
        Ok(Envelope {
            dek,
            iv,
            authorized_users: self.authorized_users,
        })
    }
}

/// Successful response body for `POST /seal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealResponse {
    /// Opaque sealed header; un-openable without KMS access.
    pub header: String,
}

// ---------------------------------------------------------------------------
// Open endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /open`.
///
/// The caller identity is carried in a request header, not in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRequest {
    /// A sealed header previously returned by `POST /seal`.
    pub header: String,
}

/// Successful response body for `POST /open`.
///
/// Carries only the recovered key material; the authorized-user list is
/// consumed by the access check and never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenResponse {
    /// Recovered data-encryption key, base64 URL-safe unpadded.
    pub dek: String,
    /// Recovered initialization vector, base64 URL-safe unpadded.
    pub iv: String,
}

impl From<Dek> for OpenResponse {
    fn from(dek: Dek) -> Self {
        Self {
            dek: URL_SAFE_NO_PAD.encode(&dek.dek),
            iv: URL_SAFE_NO_PAD.encode(&dek.iv),
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"unauthorized"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"`.
    pub status: String,
    /// Name of the active KMS backend (`"aws"` or `"local"`).
    pub kms_backend: String,
}
