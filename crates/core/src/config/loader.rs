//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::Path;

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit `path` must exist; otherwise the standard locations are
    /// searched and defaults are used when none is found.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }

        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            tracing::debug!(path = %p, "Loading configuration file");
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        schema.validate()?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(Self { schema, path: None })
    }

    /// Load with defaults only (no file)
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        ".storefinder.toml",
        "storefinder.toml",
        ".config/storefinder.toml",
    ];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {path}: {e}")).with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            crate::error::ErrorCode::ConfigParseError,
            format!("Failed to parse config file {path}: {e}"),
        )
        .with_source(e)
    })
}
