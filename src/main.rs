//! Leap Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - LEAP_CONFIG: Path to the TOML config file (default: leap.toml)
//! - LEAP_HOST: Bind address (default: 0.0.0.0)
//! - LEAP_PORT: Port number (default: 9100)
//! - RUST_LOG: Log level (default: info)
//!
//! The config file holds one `[[leap]]` table per workspace:
//!
//! ```toml
//! [[leap]]
//! enabled = true
//! url = "http://wfe.internal/run"
//! token = "..."
//! workflow = "restart-service"
//! workspace = "ops"
//! ```

use std::sync::Arc;

use leap::alert::Diagnostic;
use leap::api::{run_server, ServerConfig};
use leap::config::Configs;
use leap::service::Service;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leap=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("LEAP_CONFIG").unwrap_or_else(|_| "leap.toml".to_string());
    let configs = Configs::from_file(&config_path)?;
    let server_config = ServerConfig::from_env();

    tracing::info!("Leap configuration:");
    tracing::info!("  Config file: {}", config_path);
    tracing::info!("  Listen: {}:{}", server_config.host, server_config.port);
    for config in &configs.0 {
        tracing::info!(
            "  Workspace {:?}: enabled={} url={}",
            config.workspace,
            config.enabled,
            config.url
        );
    }

    let diag = Diagnostic::new().with_context([("service", "leap")]);
    let service = Arc::new(Service::new(configs.into_inner(), diag)?);

    run_server(server_config, service).await
}
