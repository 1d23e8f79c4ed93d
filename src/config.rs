//! Workspace configuration records
//!
//! Each record binds a workspace name to a workflow-execution endpoint.
//! Records are loaded from the `leap` section of a TOML file, either a single
//! `[leap]` table or a `[[leap]]` array of tables.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for one workspace
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Whether alerts are forwarded at all
    pub enabled: bool,
    /// Workflow-execution endpoint
    pub url: String,
    /// Bearer token sent with each request (omitted when empty)
    pub token: String,
    /// Workflow used when the caller does not name one
    pub workflow: String,
    /// Workspace name, empty for the default workspace
    pub workspace: String,
}

impl Config {
    /// Create a blank, disabled config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_workflow(mut self, workflow: impl Into<String>) -> Self {
        self.workflow = workflow.into();
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    /// Check that an enabled config names an endpoint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        Ok(())
    }

    /// Copy of this config that is safe to log or return over the API
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.token.is_empty() {
            config.token = "<redacted>".to_string();
        }
        config
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = self.redacted();
        f.debug_struct("Config")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("token", &redacted.token)
            .field("workflow", &self.workflow)
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Ordered list of workspace configs as found in a config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configs(pub Vec<Config>);

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    leap: Section,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Section {
    Many(Vec<Config>),
    One(Config),
}

impl Default for Section {
    fn default() -> Self {
        Section::Many(Vec::new())
    }
}

impl Configs {
    /// Parse and validate the `leap` section of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let configs = match file.leap {
            Section::Many(configs) => configs,
            Section::One(config) => vec![config],
        };

        for config in &configs {
            config.validate()?;
        }

        Ok(Self(configs))
    }

    /// Load configs from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn into_inner(self) -> Vec<Config> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("must specify service URL")]
    MissingUrl,

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
