//! Leap: workflow-execution alert sink
//!
//! Receives alert events from an alerting engine and forwards them to a
//! workflow-execution endpoint over HTTP. Endpoints are configured per
//! workspace; the empty workspace name selects the default one.
//!
//! # Example
//!
//! ```no_run
//! use leap::alert::Diagnostic;
//! use leap::config::Config;
//! use leap::service::Service;
//!
//! # async fn run() -> Result<(), leap::service::ServiceError> {
//! let config = Config::new()
//!     .with_enabled(true)
//!     .with_url("http://wfe.internal/run")
//!     .with_workspace("ops");
//! let service = Service::new(vec![config], Diagnostic::new())?;
//!
//! service.send_alert("ops", "restart-web", "web-1 is down").await?;
//! # Ok(())
//! # }
//! ```

pub mod alert;
pub mod api;
pub mod config;
pub mod registry;
pub mod service;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use alert::{Diagnostic, Event, Handler, Level};
pub use config::{Config, ConfigError, Configs};
pub use registry::{RegistryError, Workspace, WorkspaceRegistry};
pub use service::{AlertHandler, HandlerConfig, Service, ServiceError, TestOptions};
