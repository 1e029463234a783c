//! Configuration settings structures

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mode::Mode;
use crate::registry::{Dictionary, ModeRegistry};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "modedoc.toml";

/// Environment variable overriding the configured mode
pub const MODE_ENV_VAR: &str = "MODEDOC_MODE";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Active mode for every transform run
    pub mode: Mode,
    /// Registry construction settings
    pub registry: RegistrySettings,
    /// Extra or overriding dictionary entries, per mode
    pub vars: BTreeMap<Mode, Dictionary>,
}

/// How the short-code registry is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Start from the builtin Python/R dictionaries
    pub builtin: bool,
    /// Warn about names missing from some modes' dictionaries
    pub check_consistency: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            builtin: true,
            check_consistency: true,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `modedoc.toml` from `dir`, falling back to defaults when absent
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Replace the configured mode when an override is given
    pub fn with_mode_override(mut self, mode: Option<Mode>) -> Self {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self
    }

    /// Mode named by the `MODEDOC_MODE` environment variable, if set
    pub fn mode_from_env() -> Result<Option<Mode>> {
        match std::env::var(MODE_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value.parse()?)),
            _ => Ok(None),
        }
    }

    /// Build the registry these settings describe
    pub fn registry(&self) -> ModeRegistry {
        let mut registry = if self.registry.builtin {
            ModeRegistry::builtin()
        } else {
            ModeRegistry::empty()
        };
        for (mode, entries) in &self.vars {
            registry.extend(*mode, entries.clone());
        }
        registry
    }
}
