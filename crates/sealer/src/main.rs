//! `envelope-seal-svc` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP export).
//! 3. Initialise the configured KMS backend.
//! 4. Construct the envelope cipher and shared state.
//! 5. Build the Axum router and start the server.

mod config;
mod kms;
mod seal;
mod server;
mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use config::{Config, KmsBackendKind};
use kms::KmsClient;
use seal::EnvelopeCipher;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        kms_backend = %cfg.kms_backend,
        "envelope-seal-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. KMS backend
    // -----------------------------------------------------------------------
    let kms: Arc<dyn KmsClient> = match cfg.kms_backend {
        KmsBackendKind::Aws => Arc::new(kms::aws::AwsKms::init().await?),
        KmsBackendKind::Local => {
            // validate() guarantees the KEK map is present for this backend.
            let keks = cfg.local_keks.as_deref().unwrap_or_default();
            Arc::new(kms::local::LocalKms::from_json(keks)?)
        }
    };

    // -----------------------------------------------------------------------
    // 4. Cipher service and shared state
    // -----------------------------------------------------------------------
    let cipher = EnvelopeCipher::new(kms, cfg.kms_key_id.clone());
    let state = AppState::new(
        cipher,
        cfg.caller_header_name.clone(),
        cfg.kms_backend.to_string(),
    );

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
