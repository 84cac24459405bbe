//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.taskmate/taskmate.toml
//! 3. Project-level config: ./.taskmate/taskmate.toml
//! 4. `TASKMATE_*` environment overrides
//! 5. Command-line overrides ([`ConfigOverrides`])
//!
//! Later sources override earlier ones key by key. An explicit config path
//! replaces steps 2 and 3. `${VAR}` placeholders are resolved last, so an
//! overridden provider picks up its own API key variable.

use crate::config::schema::TaskmateConfig;
use crate::error::{Result, TaskmateError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Values given on the command line; `None` leaves the setting alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub store: Option<String>,
    pub db_path: Option<String>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut TaskmateConfig) {
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(store) = &self.store {
            config.store.backend = store.clone();
        }
        if let Some(path) = &self.db_path {
            config.store.path = path.clone();
        }
    }
}

/// Configuration loader that handles both user and project configs
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: Self::user_config_path(),
            project_config_path: Self::project_config_path(),
            explicit_path: None,
            overrides: ConfigOverrides::default(),
        }
    }

    /// Loader that reads only `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            user_config_path: None,
            project_config_path: None,
            explicit_path: Some(path.into()),
            overrides: ConfigOverrides::default(),
        }
    }

    /// Override both search locations.
    pub fn with_paths(user: impl Into<PathBuf>, project: impl Into<PathBuf>) -> Self {
        Self {
            user_config_path: Some(user.into()),
            project_config_path: Some(project.into()),
            explicit_path: None,
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// ~/.taskmate/taskmate.toml
    fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".taskmate").join("taskmate.toml"))
    }

    /// ./.taskmate/taskmate.toml
    fn project_config_path() -> Option<PathBuf> {
        std::env::current_dir()
            .ok()
            .map(|dir| dir.join(".taskmate").join("taskmate.toml"))
    }

    /// Load and merge every source, then resolve placeholders.
    pub async fn load(&self) -> Result<TaskmateConfig> {
        let mut merged = toml::Value::Table(toml::Table::new());

        if let Some(path) = &self.explicit_path {
            merge_values(&mut merged, read_toml(path).await?);
            debug!(path = %path.display(), "Loaded explicit config");
        } else {
            for path in [&self.user_config_path, &self.project_config_path]
                .into_iter()
                .flatten()
            {
                if !path.exists() {
                    debug!(path = %path.display(), "Config file not found, skipping");
                    continue;
                }
                merge_values(&mut merged, read_toml(path).await?);
                debug!(path = %path.display(), "Loaded config file");
            }
        }

        let mut config = merged
            .try_into::<TaskmateConfig>()
            .map_err(|e| TaskmateError::Config(format!("Invalid config: {}", e)))?;

        config.apply_env_overrides()?;
        self.overrides.apply(&mut config);
        config.resolve_env_vars();

        info!(
            provider = %config.llm.provider,
            store = %config.store.backend,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn get_user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn get_project_config_path(&self) -> Option<&Path> {
        self.project_config_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_toml(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        TaskmateError::Config(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        TaskmateError::Config(format!("Failed to parse config {}: {}", path.display(), e))
    })
}

/// Merge `overlay` into `base`; tables merge recursively, anything else is
/// replaced.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
