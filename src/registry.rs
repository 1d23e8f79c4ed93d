//! Workspace registry
//!
//! Maps workspace names to their config and HTTP client. The empty name is
//! the default slot: every named workspace is also aliased there as it is
//! inserted, so the most recently inserted named workspace is the default.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{Config, ConfigError};

/// Key of the default workspace
pub const DEFAULT_WORKSPACE: &str = "";

/// A workspace config bound to its HTTP client
#[derive(Debug)]
pub struct Workspace {
    config: Config,
    client: reqwest::Client,
}

impl Workspace {
    /// Validate the config and build a workspace with a fresh client
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Registry of workspaces keyed by name
#[derive(Debug, Default)]
pub struct WorkspaceRegistry {
    workspaces: RwLock<HashMap<String, Arc<Workspace>>>,
}

impl WorkspaceRegistry {
    /// Build a registry from a non-empty list of configs
    pub fn new(configs: &[Config]) -> Result<Self, RegistryError> {
        if configs.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }

        let mut workspaces = HashMap::new();
        for config in configs {
            Self::insert(&mut workspaces, config.clone())?;
        }

        Ok(Self {
            workspaces: RwLock::new(workspaces),
        })
    }

    /// Insert or replace workspaces for each config
    pub fn update<I>(&self, configs: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Config>,
    {
        self.try_update(configs.into_iter().map(Ok))
    }

    /// Apply configs in order under a single write lock.
    ///
    /// The first failing entry stops the update and its error is returned.
    /// Entries applied before it remain in place.
    pub fn try_update<I, E>(&self, entries: I) -> Result<(), E>
    where
        I: IntoIterator<Item = Result<Config, E>>,
        E: From<RegistryError>,
    {
        let mut workspaces = self.workspaces.write();
        for entry in entries {
            let config = entry?;
            let name = config.workspace.clone();
            let replaced = workspaces.contains_key(&name);
            Self::insert(&mut workspaces, config)?;
            tracing::debug!(workspace = %name, replaced, "Workspace updated");
        }
        Ok(())
    }

    fn insert(
        workspaces: &mut HashMap<String, Arc<Workspace>>,
        config: Config,
    ) -> Result<(), RegistryError> {
        let name = config.workspace.clone();
        let workspace = Arc::new(Workspace::new(config)?);

        if !name.is_empty() {
            workspaces.insert(DEFAULT_WORKSPACE.to_string(), Arc::clone(&workspace));
        }
        workspaces.insert(name, workspace);
        Ok(())
    }

    /// Get the workspace registered under `id`
    pub fn workspace(&self, id: &str) -> Result<Arc<Workspace>, RegistryError> {
        let workspaces = self.workspaces.read();
        if workspaces.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }
        workspaces
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownWorkspace(id.to_string()))
    }

    /// Get the config registered under `id`
    pub fn lookup(&self, id: &str) -> Result<Config, RegistryError> {
        self.workspace(id).map(|w| w.config().clone())
    }

    /// Registered workspace names, sorted, including the default slot
    pub fn workspace_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.workspaces.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.workspaces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.read().is_empty()
    }
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),

    #[error("no configuration found")]
    EmptyRegistry,

    #[error("workspace id not found: {0:?}")]
    UnknownWorkspace(String),
}
