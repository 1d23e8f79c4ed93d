//! Event handler bound to a workflow

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Service;
use crate::alert::{Diagnostic, Event, Handler};

/// Per-handler options set by the alert definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Target workflow for the alerts
    #[serde(rename = "wfe", alias = "workflow", default)]
    pub workflow: String,
    /// Workspace to send through, default slot when empty
    #[serde(default)]
    pub workspace: String,
}

/// Forwards each event message to the bound workflow
#[derive(Debug)]
pub struct AlertHandler {
    service: Arc<Service>,
    config: HandlerConfig,
    diag: Diagnostic,
}

impl AlertHandler {
    pub fn new(service: Arc<Service>, config: HandlerConfig, diag: Diagnostic) -> Self {
        Self {
            service,
            config,
            diag,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }
}

#[async_trait]
impl Handler for AlertHandler {
    async fn handle(&self, event: &Event) {
        if let Err(e) = self
            .service
            .send_alert(
                &self.config.workspace,
                &self.config.workflow,
                &event.state.message,
            )
            .await
        {
            self.diag.error("failed to send event", &e);
        }
    }
}
