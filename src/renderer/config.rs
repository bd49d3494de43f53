//! Configuration for SVG rendering

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a renderer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration options for SVG output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Emit `var(--name, fallback)` for paints bound to a variable
    pub reference_variables: bool,

    /// Spaces per nesting level
    pub tab_width: usize,

    /// Decimal places kept in path data
    pub path_precision: usize,

    /// Drop geometry that has no paint instead of emitting `fill="none"`
    pub skip_unpainted_geometry: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            reference_variables: false,
            tab_width: 2,
            path_precision: 4,
            skip_unpainted_geometry: true,
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_reference_variables(mut self, reference: bool) -> Self {
        self.reference_variables = reference;
        self
    }

    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }

    pub fn with_path_precision(mut self, precision: usize) -> Self {
        self.path_precision = precision;
        self
    }

    pub fn with_skip_unpainted_geometry(mut self, skip: bool) -> Self {
        self.skip_unpainted_geometry = skip;
        self
    }
}
