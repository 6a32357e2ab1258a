//! Runtime configuration
//!
//! Where the stores live and which method boots the system. Hosts either
//! build a config programmatically (builder style) or load one from a
//! TOML file:
//!
//! ```toml
//! methodology_path = "state/agerun.methodology"
//! agent_store_path = "state/agerun.agency"
//! bootstrap_method = "supervisor"
//! bootstrap_version = "1"
//! ```

use agerun_core::{ErrorKind, RuntimeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_METHODOLOGY_PATH: &str = "agerun.methodology";
pub const DEFAULT_AGENT_STORE_PATH: &str = "agerun.agency";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Path of the line-based methodology catalog.
    pub methodology_path: PathBuf,
    /// Path of the YAML agent population file.
    pub agent_store_path: PathBuf,
    /// Method spawned by `init` when the host passes none.
    pub bootstrap_method: Option<String>,
    pub bootstrap_version: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            methodology_path: PathBuf::from(DEFAULT_METHODOLOGY_PATH),
            agent_store_path: PathBuf::from(DEFAULT_AGENT_STORE_PATH),
            bootstrap_method: None,
            bootstrap_version: None,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> RuntimeConfig {
        RuntimeConfig::default()
    }

    pub fn with_methodology_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.methodology_path = path.into();
        self
    }

    pub fn with_agent_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.agent_store_path = path.into();
        self
    }

    pub fn with_bootstrap(
        mut self,
        method: impl Into<String>,
        version: Option<&str>,
    ) -> Self {
        self.bootstrap_method = Some(method.into());
        self.bootstrap_version = version.map(str::to_string);
        self
    }

    /// Parse a config from TOML text. Unknown fields are rejected.
    pub fn from_toml_str(text: &str) -> Result<RuntimeConfig, RuntimeError> {
        toml::from_str(text).map_err(|err| {
            RuntimeError::new(
                ErrorKind::Persistence,
                format!("invalid runtime config: {}", err),
            )
        })
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<RuntimeConfig, RuntimeError> {
        let text = fs::read_to_string(path).map_err(|err| {
            RuntimeError::new(
                ErrorKind::Persistence,
                format!("cannot read config {}: {}", path.display(), err),
            )
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::new();
        assert_eq!(
            config.methodology_path,
            PathBuf::from(DEFAULT_METHODOLOGY_PATH)
        );
        assert_eq!(
            config.agent_store_path,
            PathBuf::from(DEFAULT_AGENT_STORE_PATH)
        );
        assert!(config.bootstrap_method.is_none());
    }

    #[test]
    fn test_builder() {
        let config = RuntimeConfig::new()
            .with_methodology_path("custom.methodology")
            .with_bootstrap("supervisor", Some("1.2"));
        assert_eq!(config.methodology_path, PathBuf::from("custom.methodology"));
        assert_eq!(config.bootstrap_method.as_deref(), Some("supervisor"));
        assert_eq!(config.bootstrap_version.as_deref(), Some("1.2"));
    }

    #[test]
    fn test_from_toml() {
        let config = RuntimeConfig::from_toml_str(
            "methodology_path = \"m.cat\"\nbootstrap_method = \"boot\"\n",
        )
        .unwrap();
        assert_eq!(config.methodology_path, PathBuf::from("m.cat"));
        assert_eq!(config.bootstrap_method.as_deref(), Some("boot"));
        // Unspecified fields keep their defaults.
        assert_eq!(
            config.agent_store_path,
            PathBuf::from(DEFAULT_AGENT_STORE_PATH)
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RuntimeConfig::from_toml_str("mystery_knob = true\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Persistence);
    }
}
