//! Configuration for the demonstration binary, with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hipstree/hipstree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `HIPSTREE_*` prefix, `__` between nested keys
//!
//! The library itself is not configured; a `Tree` only takes its random source.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::tree::{leaf_count_for_level, DEFAULT_SEPARATOR};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot load config: {message}")]
    Load { message: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Large-tree walkthrough settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DemoConfig {
    /// Layers of the large demo tree
    pub depth: usize,
    /// Random swaps applied to it
    pub swaps: usize,
    /// Leaves printed at each end of the large tree
    pub print_count: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            depth: 10,
            swaps: 10,
            print_count: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Seed for every tree built by the binary, `None` seeds from the OS
    pub seed: Option<u64>,
    /// Separator between printed leaf values
    pub separator: String,
    /// Largest depth the binary will build
    pub max_depth: usize,
    pub demo: DemoConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            max_depth: 28,
            demo: DemoConfig::default(),
        }
    }
}

/// Get the XDG config directory for hipstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hipstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hipstree.toml"))
}

fn load_err(e: config::ConfigError) -> SettingsError {
    SettingsError::Load {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence, then validate them.
    #[instrument(level = "debug")]
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            debug!("global config: {}", global_path.display());
            builder = builder.add_source(File::from(global_path).required(false));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SettingsError::Load {
                    message: format!("file not found: {}", path.display()),
                });
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("HIPSTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .map_err(load_err)?
            .try_deserialize()
            .map_err(load_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string, without any other layer.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content).map_err(|e| SettingsError::Load {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Invalid {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if leaf_count_for_level(self.max_depth).is_err() {
            return Err(SettingsError::Invalid {
                message: format!("max_depth {} is not a buildable depth", self.max_depth),
            });
        }
        if self.demo.depth == 0 || self.demo.depth > self.max_depth {
            return Err(SettingsError::Invalid {
                message: format!(
                    "demo.depth must be in 1..={}, got {}",
                    self.max_depth, self.demo.depth
                ),
            });
        }
        let leaves = 1usize << (self.demo.depth - 1);
        if self.demo.print_count.saturating_mul(2) > leaves {
            return Err(SettingsError::Invalid {
                message: format!(
                    "demo.print_count {} prints more than the {} leaves of a depth {} tree",
                    self.demo.print_count, leaves, self.demo.depth
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.separator, ", ");
        assert_eq!(settings.demo.depth, 10);
    }

    #[test]
    fn test_from_toml_partial_keeps_defaults() {
        let settings = Settings::from_toml("seed = 7\n[demo]\nswaps = 3\n").unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.demo.swaps, 3);
        assert_eq!(settings.demo.depth, 10);
        assert_eq!(settings.max_depth, 28);
    }

    #[test]
    fn test_validate_rejects_depth_over_max() {
        let mut settings = Settings::default();
        settings.demo.depth = settings.max_depth + 1;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_print_count_over_leaves() {
        let mut settings = Settings::default();
        settings.demo.depth = 3;
        settings.demo.print_count = 3;
        assert!(settings.validate().is_err());
        settings.demo.print_count = 2;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_to_toml_round_trips_through_from_toml() {
        let mut settings = Settings::default();
        settings.seed = Some(99);
        let text = settings.to_toml().unwrap();
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }
}
