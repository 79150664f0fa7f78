//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/headertree/headertree.toml`
//! 3. Local config: the `--config` file, else `./.headertree.toml` if present
//! 4. Environment variables: `HEADERTREE_*` prefix, `__` between section and key
//!    (e.g. `HEADERTREE_BUILDER__MAX_PASSES=16`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, DEFAULT_MAX_PASSES};

/// Tree builder settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuilderConfig {
    /// Grouping passes allowed per build before giving up
    pub max_passes: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Column definition settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefinitionsConfig {
    /// Pad shallow columns so every leaf sits on the same header row
    pub balance: bool,
    /// Definition file used when none is given on the command line
    pub path: Option<PathBuf>,
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self {
            balance: true,
            path: None,
        }
    }
}

/// Tree rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_instance_ids: bool,
    pub show_pinned: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_instance_ids: true,
            show_pinned: true,
        }
    }
}

/// Unified configuration for headertree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub builder: BuilderConfig,
    pub definitions: DefinitionsConfig,
    pub display: DisplayConfig,
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub builder: RawBuilderConfig,
    pub definitions: RawDefinitionsConfig,
    pub display: RawDisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawBuilderConfig {
    pub max_passes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDefinitionsConfig {
    pub balance: Option<bool>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_instance_ids: Option<bool>,
    pub show_pinned: Option<bool>,
}

/// Get the XDG config directory for headertree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "headertree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("headertree.toml"))
}

/// Local config file looked up in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".headertree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins for every value it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            builder: BuilderConfig {
                max_passes: overlay
                    .builder
                    .max_passes
                    .unwrap_or(self.builder.max_passes),
            },
            definitions: DefinitionsConfig {
                balance: overlay
                    .definitions
                    .balance
                    .unwrap_or(self.definitions.balance),
                path: overlay
                    .definitions
                    .path
                    .clone()
                    .or_else(|| self.definitions.path.clone()),
            },
            display: DisplayConfig {
                show_instance_ids: overlay
                    .display
                    .show_instance_ids
                    .unwrap_or(self.display.show_instance_ids),
                show_pinned: overlay
                    .display
                    .show_pinned
                    .unwrap_or(self.display.show_pinned),
            },
        }
    }

    /// Expand `~` and `$VAR` in the definition path.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.definitions.path {
            let expanded = expand_env_vars(path.to_string_lossy().as_ref());
            self.definitions.path = Some(PathBuf::from(expanded));
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.builder.max_passes == 0 {
            return Err(ApplicationError::Config {
                message: "builder.max_passes must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist if given. Without
    ///   it `./.headertree.toml` is used when present.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        match local {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let path = local_config_path();
                if path.exists() {
                    current = current.merge_with(&load_raw_settings(&path)?);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply HEADERTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("HEADERTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_int("builder.max_passes") {
            settings.builder.max_passes =
                usize::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("builder.max_passes out of range: {}", val),
                })?;
        }
        if let Ok(val) = config.get_bool("definitions.balance") {
            settings.definitions.balance = val;
        }
        if let Ok(val) = config.get_string("definitions.path") {
            settings.definitions.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("display.show_instance_ids") {
            settings.display.show_instance_ids = val;
        }
        if let Ok(val) = config.get_bool("display.show_pinned") {
            settings.display.show_pinned = val;
        }

        Ok(settings)
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
