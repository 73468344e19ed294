// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Source-type configuration surface.
//!
//! The core consumes, but does not own, a per-source-type configuration:
//! a name, the topics it may publish to, the content types it accepts,
//! and a free-form string map used e.g. to enable or disable individual
//! CWA block decoders. The CLI loads these from a TOML file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error loading source-type configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be parsed.
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for one source type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTypeConfig {
    /// Source type name, the key into the static registry
    pub name: String,
    /// Topics this source type publishes to
    #[serde(default)]
    pub topics: Vec<String>,
    /// Content types this source type accepts
    #[serde(default)]
    pub content_types: Vec<String>,
    /// Free-form per-source settings
    #[serde(default)]
    pub configuration: BTreeMap<String, String>,
}

impl SourceTypeConfig {
    /// Create a config carrying only a name, with defaults elsewhere.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Look up a configuration value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).map(String::as_str)
    }

    /// Interpret a configuration value as a boolean flag.
    ///
    /// Absent keys take the given default; present keys are true unless
    /// the value is "false", "no", or "0".
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.configuration.get(key) {
            None => default,
            Some(value) => !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "false" | "no" | "0"
            ),
        }
    }

    /// Set a configuration value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }
}

/// A configuration file holding several source types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTypesFile {
    /// Configured source types
    #[serde(default)]
    pub source_types: Vec<SourceTypeConfig>,
}

impl SourceTypesFile {
    /// Parse from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Find a source type by name.
    pub fn source_type(&self, name: &str) -> Option<&SourceTypeConfig> {
        self.source_types.iter().find(|s| s.name == name)
    }
}
