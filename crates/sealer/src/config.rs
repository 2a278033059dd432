//! Configuration loading and validation for the sealing service.
//!
//! All values are read from environment variables at startup. The process
//! will exit with a clear error message if any required variable is missing
//! or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Which KMS backend acts as root-of-trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KmsBackendKind {
    /// AWS KMS via the SDK default credential chain.
    Aws,
    /// In-process AEAD keyed by `LOCAL_KEKS`.
    Local,
}

impl std::fmt::Display for KmsBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KmsBackendKind::Aws => f.write_str("aws"),
            KmsBackendKind::Local => f.write_str("local"),
        }
    }
}

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// KMS backend selection.
    #[serde(default = "default_kms_backend")]
    pub kms_backend: KmsBackendKind,

    /// Key identifier passed on every KMS call. **Required.**
    pub kms_key_id: String,

    /// JSON map of key id → base64 KEK. **Required when `kms_backend` is
    /// `local`**; ignored otherwise.
    #[serde(default)]
    pub local_keks: Option<String>,

    /// HTTP header carrying the caller identity on `/open`.
    #[serde(default = "default_caller_header")]
    pub caller_header_name: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP endpoint for trace export. Optional; traces stay local when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_kms_backend() -> KmsBackendKind {
    KmsBackendKind::Aws
}
fn default_caller_header() -> String {
    "X-Caller-Identity".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.kms_key_id, "KMS_KEY_ID")?;
        ensure_non_empty(&self.caller_header_name, "CALLER_HEADER_NAME")?;

        if self.kms_backend == KmsBackendKind::Local {
            match self.local_keks.as_deref() {
                Some(keks) if !keks.trim().is_empty() => {}
                _ => anyhow::bail!("LOCAL_KEKS is required when KMS_BACKEND is \"local\""),
            }
        }
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be non-zero");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            kms_backend: default_kms_backend(),
            kms_key_id: "alias/envelope-seal".into(),
            local_keks: None,
            caller_header_name: default_caller_header(),
            listen_port: default_listen_port(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_kms_backend(), KmsBackendKind::Aws);
        assert_eq!(default_caller_header(), "X-Caller-Identity");
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_key_id() {
        let cfg = Config {
            kms_key_id: "".into(),
            ..valid_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_requires_keks_for_local_backend() {
        let cfg = Config {
            kms_backend: KmsBackendKind::Local,
            ..valid_config()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            kms_backend: KmsBackendKind::Local,
            local_keks: Some(r#"{"primary":"abc"}"#.into()),
            ..valid_config()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let cfg = Config {
            listen_port: 0,
            ..valid_config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn backend_labels() {
        assert_eq!(KmsBackendKind::Aws.to_string(), "aws");
        assert_eq!(KmsBackendKind::Local.to_string(), "local");
    }
}
