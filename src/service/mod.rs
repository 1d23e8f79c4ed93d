//! Workflow-execution alert service
//!
//! Owns the workspace registry and forwards alerts to the endpoint of the
//! selected workspace with a single GET request.

pub mod handler;

pub use handler::{AlertHandler, HandlerConfig};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alert::{Diagnostic, Level};
use crate::config::Config;
use crate::registry::{RegistryError, Workspace, WorkspaceRegistry, DEFAULT_WORKSPACE};

/// Alert service backed by a workspace registry
#[derive(Debug)]
pub struct Service {
    registry: WorkspaceRegistry,
    diag: Diagnostic,
}

impl Service {
    /// Create a service from a non-empty list of workspace configs
    pub fn new(configs: Vec<Config>, diag: Diagnostic) -> Result<Self, ServiceError> {
        let registry = WorkspaceRegistry::new(&configs)?;
        Ok(Self::with_registry(registry, diag))
    }

    pub fn with_registry(registry: WorkspaceRegistry, diag: Diagnostic) -> Self {
        Self { registry, diag }
    }

    pub fn open(&self) -> Result<(), ServiceError> {
        self.diag.info("leap service opened");
        Ok(())
    }

    pub fn close(&self) -> Result<(), ServiceError> {
        self.diag.info("leap service closed");
        Ok(())
    }

    /// Apply raw config entries in order.
    ///
    /// An entry that is not a config record aborts the update with
    /// [`ServiceError::TypeMismatch`]; entries before it stay applied.
    pub fn update(&self, configs: Vec<serde_json::Value>) -> Result<(), ServiceError> {
        let count = configs.len();
        self.registry.try_update(configs.into_iter().map(|value| {
            serde_json::from_value::<Config>(value)
                .map_err(|e| ServiceError::TypeMismatch(e.to_string()))
        }))?;
        tracing::info!(entries = count, "Workspace configs updated");
        Ok(())
    }

    /// Apply typed config entries in order
    pub fn update_configs(&self, configs: Vec<Config>) -> Result<(), ServiceError> {
        self.registry.update(configs)?;
        Ok(())
    }

    /// Config of the given workspace
    pub fn config(&self, workspace: &str) -> Result<Config, ServiceError> {
        Ok(self.registry.lookup(workspace)?)
    }

    pub fn registry(&self) -> &WorkspaceRegistry {
        &self.registry
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diag
    }

    /// Send an alert to the workflow endpoint of `workspace`.
    ///
    /// `workflow` and `message` travel as query parameters; an empty
    /// `workflow` falls back to the workspace's configured one. Only a 200
    /// response counts as success and the body is not read.
    pub async fn send_alert(
        &self,
        workspace: &str,
        workflow: &str,
        message: &str,
    ) -> Result<(), ServiceError> {
        let ws: Arc<Workspace> = self.registry.workspace(workspace)?;
        let config = ws.config();

        if !config.enabled {
            return Err(ServiceError::Disabled);
        }

        let workflow = if workflow.is_empty() {
            config.workflow.as_str()
        } else {
            workflow
        };

        let mut request = ws
            .client()
            .get(&config.url)
            .query(&[("workflow", workflow), ("message", message)]);
        if !config.token.is_empty() {
            request = request.bearer_auth(&config.token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ServiceError::UnexpectedStatus(status.as_u16()));
        }

        tracing::debug!(
            workspace = %workspace,
            workflow = %workflow,
            url = %config.url,
            "Alert sent"
        );

        Ok(())
    }

    /// Build an event handler bound to a workflow
    pub fn handler<K, V>(
        self: &Arc<Self>,
        config: HandlerConfig,
        ctx: impl IntoIterator<Item = (K, V)>,
    ) -> AlertHandler
    where
        K: Into<String>,
        V: Into<String>,
    {
        AlertHandler::new(Arc::clone(self), config, self.diag.with_context(ctx))
    }

    /// Canned payload for connectivity tests
    pub fn test_options(&self) -> TestOptions {
        TestOptions::default()
    }

    /// Send a test alert through the regular alert path
    pub async fn test(&self, options: &TestOptions) -> Result<(), ServiceError> {
        self.send_alert(&options.workspace, "", &options.message)
            .await
    }
}

/// Payload for connectivity tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestOptions {
    pub workspace: String,
    pub message: String,
    pub level: Level,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            workspace: DEFAULT_WORKSPACE.to_string(),
            message: "test leap message".to_string(),
            level: Level::Critical,
        }
    }
}

/// Service errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("service is not enabled")]
    Disabled,

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response code {0} from workflow service")]
    UnexpectedStatus(u16),

    #[error("expected config object: {0}")]
    TypeMismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::spawn_endpoint;
    use axum::http::StatusCode;

    fn service_for(url: &str) -> Service {
        let config = Config::new()
            .with_enabled(true)
            .with_url(url)
            .with_workflow("restart-service")
            .with_workspace("ops");
        Service::new(vec![config], Diagnostic::new()).unwrap()
    }

    #[tokio::test]
    async fn test_send_alert_ok() {
        let endpoint = spawn_endpoint(StatusCode::OK).await;
        let service = service_for(&endpoint.url);

        service.send_alert("ops", "", "cpu high").await.unwrap();

        let requests = endpoint.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query["workflow"], "restart-service");
        assert_eq!(requests[0].query["message"], "cpu high");
        assert_eq!(requests[0].authorization, None);
    }

    #[tokio::test]
    async fn test_send_alert_explicit_workflow_and_token() {
        let endpoint = spawn_endpoint(StatusCode::OK).await;
        let config = Config::new()
            .with_enabled(true)
            .with_url(&endpoint.url)
            .with_token("s3cret");
        let service = Service::new(vec![config], Diagnostic::new()).unwrap();

        service.send_alert("", "scale-up", "load").await.unwrap();

        let requests = endpoint.requests();
        assert_eq!(requests[0].query["workflow"], "scale-up");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer s3cret"));
    }

    #[tokio::test]
    async fn test_send_alert_unexpected_status() {
        let endpoint = spawn_endpoint(StatusCode::NOT_FOUND).await;
        let service = service_for(&endpoint.url);

        let err = service.send_alert("ops", "", "cpu high").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedStatus(404)));
    }

    #[tokio::test]
    async fn test_send_alert_other_success_codes_fail() {
        let endpoint = spawn_endpoint(StatusCode::NO_CONTENT).await;
        let service = service_for(&endpoint.url);

        let err = service.send_alert("ops", "", "cpu high").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedStatus(204)));
    }

    #[tokio::test]
    async fn test_send_alert_disabled_skips_network() {
        let endpoint = spawn_endpoint(StatusCode::OK).await;
        let config = Config::new().with_url(&endpoint.url).with_workspace("ops");
        let service = Service::new(vec![config], Diagnostic::new()).unwrap();

        let err = service.send_alert("ops", "", "cpu high").await.unwrap_err();
        assert!(matches!(err, ServiceError::Disabled));
        assert!(endpoint.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_alert_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = service_for(&format!("http://{}/run", addr));
        let err = service.send_alert("ops", "", "cpu high").await.unwrap_err();
        match &err {
            ServiceError::Transport(inner) => assert_eq!(err.to_string(), inner.to_string()),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_alert_unknown_workspace() {
        let service = service_for("http://127.0.0.1:1/run");
        let err = service.send_alert("dev", "", "cpu high").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Registry(RegistryError::UnknownWorkspace(_))
        ));
    }

    #[tokio::test]
    async fn test_send_alert_empty_registry() {
        let service = Service::with_registry(WorkspaceRegistry::default(), Diagnostic::new());
        let err = service.send_alert("", "", "cpu high").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Registry(RegistryError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_update_raw_entries() {
        let service = service_for("http://a");
        service
            .update(vec![serde_json::json!({
                "enabled": true,
                "url": "http://b",
                "workspace": "dev",
            })])
            .unwrap();

        assert_eq!(service.config("dev").unwrap().url, "http://b");
        assert_eq!(service.config("").unwrap().url, "http://b");
        assert_eq!(service.config("ops").unwrap().url, "http://a");
    }

    #[test]
    fn test_update_type_mismatch_keeps_earlier_entries() {
        let service = service_for("http://a");
        let err = service
            .update(vec![
                serde_json::json!({"enabled": true, "url": "http://b", "workspace": "dev"}),
                serde_json::json!("not a config"),
                serde_json::json!({"enabled": true, "url": "http://c", "workspace": "qa"}),
            ])
            .unwrap_err();

        assert!(matches!(err, ServiceError::TypeMismatch(_)));
        assert!(service.config("dev").is_ok());
        assert!(matches!(
            service.config("qa"),
            Err(ServiceError::Registry(RegistryError::UnknownWorkspace(_)))
        ));
    }

    #[test]
    fn test_update_foreign_record_is_type_mismatch() {
        let service = service_for("http://a");
        let err = service
            .update(vec![serde_json::json!({"wfe": "restart", "level": "critical"})])
            .unwrap_err();

        assert!(matches!(err, ServiceError::TypeMismatch(_)));
        let default = service.config("").unwrap();
        assert_eq!(default.workspace, "ops");
        assert_eq!(default.url, "http://a");
    }

    #[test]
    fn test_partial_test_options_use_defaults() {
        let options: TestOptions =
            serde_json::from_value(serde_json::json!({"workspace": "ops"})).unwrap();
        assert_eq!(options.workspace, "ops");
        assert_eq!(options.message, "test leap message");
        assert_eq!(options.level, Level::Critical);
    }

    #[test]
    fn test_update_invalid_entry() {
        let service = service_for("http://a");
        let err = service
            .update_configs(vec![Config::new().with_enabled(true).with_workspace("dev")])
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Registry(RegistryError::Invalid(_))
        ));
    }

    #[test]
    fn test_lifecycle_hooks() {
        let service = service_for("http://a");
        assert!(service.open().is_ok());
        assert!(service.close().is_ok());
    }

    #[test]
    fn test_test_options() {
        let service = service_for("http://a");
        let options = service.test_options();
        assert_eq!(options.workspace, "");
        assert_eq!(options.message, "test leap message");
        assert_eq!(options.level, Level::Critical);
    }

    #[tokio::test]
    async fn test_test_hook_sends_alert() {
        let endpoint = spawn_endpoint(StatusCode::OK).await;
        let service = service_for(&endpoint.url);

        service.test(&service.test_options()).await.unwrap();

        let requests = endpoint.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query["message"], "test leap message");
    }
}
