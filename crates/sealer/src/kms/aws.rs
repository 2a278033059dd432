//! AWS KMS backend for the [`KmsClient`] capability.

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kms::primitives::Blob;

use super::{KmsClient, KmsError};

/// KMS client backed by AWS KMS.
///
/// The SDK client is initialised once at startup and shared across requests;
/// credentials are resolved via the standard AWS credential chain.
#[derive(Clone)]
pub struct AwsKms {
    client: aws_sdk_kms::Client,
}

impl AwsKms {
    /// Initialise the SDK client from the default credential chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK config cannot be loaded.
    pub async fn init() -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Ok(Self {
            client: aws_sdk_kms::Client::new(&config),
        })
    }
}

#[async_trait]
impl KmsClient for AwsKms {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let resp = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext.to_vec()))
            .send()
            .await
            .map_err(|e| KmsError::Backend(e.to_string()))?;

        let blob = resp
            .ciphertext_blob()
            .ok_or_else(|| KmsError::Backend("encrypt response contained no ciphertext".into()))?;
        Ok(blob.as_ref().to_vec())
    }

    async fn decrypt(&self, key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let resp = self
            .client
            .decrypt()
            .key_id(key_id)
            .ciphertext_blob(Blob::new(ciphertext.to_vec()))
            .send()
            .await
            .map_err(|e| KmsError::Backend(e.to_string()))?;

        let blob = resp
            .plaintext()
            .ok_or_else(|| KmsError::Backend("decrypt response contained no plaintext".into()))?;
        Ok(blob.as_ref().to_vec())
    }
}
