//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::seal::EnvelopeCipher;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped) so that Axum can clone
/// the state for each request. There is no per-request mutable state:
/// concurrent seal/open calls share nothing but the cipher capability.
#[derive(Clone)]
pub struct AppState {
    /// Seals and opens envelopes against the configured KMS backend.
    pub cipher: Arc<EnvelopeCipher>,
    /// Name of the HTTP header carrying the caller identity on `/open`.
    pub caller_header_name: Arc<String>,
    /// Label of the active KMS backend, reported by `/health`.
    pub kms_backend: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(cipher: EnvelopeCipher, caller_header_name: String, kms_backend: String) -> Self {
        Self {
            cipher: Arc::new(cipher),
            caller_header_name: Arc::new(caller_header_name),
            kms_backend: Arc::new(kms_backend),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    use crate::kms::local::{LocalKms, KEY_LEN};

    let kek = URL_SAFE_NO_PAD.encode([0x42u8; KEY_LEN]);
    let kms = LocalKms::from_json(&format!(r#"{{"primary":"{kek}"}}"#)).unwrap();
    AppState::new(
        EnvelopeCipher::new(Arc::new(kms), "primary"),
        "X-Caller-Identity".into(),
        "local".into(),
    )
}
