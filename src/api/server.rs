use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_config, handle_event, health_check, list_workspaces, run_test, send_alert, test_options,
    update_config, AppState,
};
use crate::service::Service;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9100,
        }
    }
}

impl ServerConfig {
    /// Read LEAP_HOST and LEAP_PORT, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("LEAP_HOST").unwrap_or(defaults.host);
        let port = std::env::var("LEAP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        Self { host, port }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Workspace configuration
        .route("/workspaces", get(list_workspaces))
        .route("/config", get(get_config).put(update_config))
        // Alert delivery
        .route("/alert", post(send_alert))
        .route("/events", post(handle_event))
        // Connectivity test
        .route("/test", get(test_options).post(run_test))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(
    config: ServerConfig,
    service: Arc<Service>,
) -> Result<(), Box<dyn std::error::Error>> {
    service.open()?;

    let state = Arc::new(AppState {
        service: Arc::clone(&service),
    });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting leap server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.close()?;
    tracing::info!("Leap server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
