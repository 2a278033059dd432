//! Local KMS backend: named KEKs and an in-process AEAD.
//!
//! For development and self-hosted deployments without AWS access. KEKs are
//! supplied as a JSON map of key id → base64 URL-safe unpadded 256-bit key,
//! and each key id gets its own AES-256-GCM-SIV cipher.
//!
//! # Ciphertext format
//!
//! ```text
//! nonce (12 bytes) || ciphertext + tag
//! ```

use std::collections::HashMap;

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use super::{KmsClient, KmsError};

/// Byte length of a KEK (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// KMS client backed by in-process AES-256-GCM-SIV ciphers, one per key id.
pub struct LocalKms {
    keks: HashMap<String, Aes256GcmSiv>,
}

impl LocalKms {
    /// Parse a JSON map of key id → base64 KEK into a [`LocalKms`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the map is empty, a key is
    /// not valid base64, or a key is not exactly [`KEY_LEN`] bytes.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .context("LOCAL_KEKS must be a JSON map of key id to base64 KEK")?;
        if raw.is_empty() {
            bail!("LOCAL_KEKS must contain at least one key");
        }

        let mut keks = HashMap::with_capacity(raw.len());
        for (key_id, encoded) in raw {
            let bytes = URL_SAFE_NO_PAD
                .decode(&encoded)
                .with_context(|| format!("KEK {key_id} is not valid base64"))?;
            if bytes.len() != KEY_LEN {
                bail!("KEK {key_id} must be {KEY_LEN} bytes, got {}", bytes.len());
            }
            let cipher = Aes256GcmSiv::new_from_slice(&bytes)
                .map_err(|_| anyhow::anyhow!("KEK {key_id} was rejected by the cipher"))?;
            keks.insert(key_id, cipher);
        }
        Ok(Self { keks })
    }

    fn cipher(&self, key_id: &str) -> Result<&Aes256GcmSiv, KmsError> {
        self.keks
            .get(key_id)
            .ok_or_else(|| KmsError::UnknownKey(key_id.to_owned()))
    }
}

#[async_trait]
impl KmsClient for LocalKms {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let cipher = self.cipher(key_id)?;

        // Use OsRng for a cryptographically secure random nonce.
        use aes_gcm_siv::aead::rand_core::RngCore;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| KmsError::Backend("aead encrypt failure".into()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    async fn decrypt(&self, key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let cipher = self.cipher(key_id)?;
        if ciphertext.len() < NONCE_LEN {
            return Err(KmsError::Rejected);
        }
        let (nonce_bytes, body) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        cipher.decrypt(nonce, body).map_err(|_| KmsError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_kms() -> LocalKms {
        let kek = URL_SAFE_NO_PAD.encode([0x42u8; KEY_LEN]);
        LocalKms::from_json(&format!(r#"{{"primary":"{kek}"}}"#)).unwrap()
    }

    #[tokio::test]
    async fn encrypt_decrypt_round_trip() {
        let kms = test_kms();
        let plaintext = b"canonical envelope bytes";
        let ciphertext = kms.encrypt("primary", plaintext).await.unwrap();
        let recovered = kms.decrypt("primary", &ciphertext).await.unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[tokio::test]
    async fn unknown_key_id_rejected() {
        let kms = test_kms();
        let err = kms.encrypt("missing", b"x").await.unwrap_err();
        assert!(matches!(err, KmsError::UnknownKey(_)));
        let err = kms.decrypt("missing", b"x").await.unwrap_err();
        assert!(matches!(err, KmsError::UnknownKey(_)));
    }

    #[tokio::test]
    async fn wrong_key_fails_decryption() {
        let kek1 = URL_SAFE_NO_PAD.encode([0x01u8; KEY_LEN]);
        let kek2 = URL_SAFE_NO_PAD.encode([0x02u8; KEY_LEN]);
        let kms =
            LocalKms::from_json(&format!(r#"{{"k1":"{kek1}","k2":"{kek2}"}}"#)).unwrap();
        let ciphertext = kms.encrypt("k1", b"secret").await.unwrap();
        assert!(matches!(
            kms.decrypt("k2", &ciphertext).await,
            Err(KmsError::Rejected)
        ));
    }

    #[tokio::test]
    async fn tampered_ciphertext_fails_auth() {
        let kms = test_kms();
        let mut ciphertext = kms.encrypt("primary", b"tamper me").await.unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;
        assert!(matches!(
            kms.decrypt("primary", &ciphertext).await,
            Err(KmsError::Rejected)
        ));
    }

    #[tokio::test]
    async fn blob_shorter_than_nonce_rejected() {
        let kms = test_kms();
        assert!(matches!(
            kms.decrypt("primary", &[0u8; NONCE_LEN - 1]).await,
            Err(KmsError::Rejected)
        ));
    }

    #[test]
    fn from_json_rejects_malformed_json() {
        assert!(LocalKms::from_json("not json").is_err());
    }

    #[test]
    fn from_json_rejects_empty_map() {
        assert!(LocalKms::from_json("{}").is_err());
    }

    #[test]
    fn from_json_rejects_bad_base64() {
        assert!(LocalKms::from_json(r#"{"k":"!!!"}"#).is_err());
    }

    #[test]
    fn from_json_rejects_short_key() {
        let short = URL_SAFE_NO_PAD.encode([0u8; 16]);
        assert!(LocalKms::from_json(&format!(r#"{{"k":"{short}"}}"#)).is_err());
    }
}
