//! Configuration loading from disk.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::schema::{
    FlagValue, ListenerConfig, ObservabilityConfig, SanitySettings, ServiceConfig,
};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid boolean for `{key}`: {value:?}")]
    InvalidBool { key: String, value: String },

    #[error("`{key}` must be a table, found {found}")]
    InvalidTable { key: String, found: &'static str },
}

/// On-disk layout before the `[sanity]` table is resolved.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    listener: ListenerConfig,
    observability: ObservabilityConfig,
    sanity: toml::Table,
}

/// Load the demo server configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    config_from_toml(&content)
}

/// Parse a full service configuration from TOML text.
pub fn config_from_toml(content: &str) -> Result<ServiceConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(content)?;
    let sanity = resolve_table(&raw.sanity)?;

    Ok(ServiceConfig {
        listener: raw.listener,
        observability: raw.observability,
        sanity,
    })
}

/// Load only the sanity settings from the `[sanity]` table of a TOML file.
pub fn load_settings(path: &Path) -> Result<SanitySettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    settings_from_toml(&content)
}

/// Parse the `[sanity]` table of a TOML document. A missing table yields the
/// defaults.
pub fn settings_from_toml(content: &str) -> Result<SanitySettings, ConfigError> {
    let mut document: toml::Table = toml::from_str(content)?;
    match document.remove("sanity") {
        Some(toml::Value::Table(table)) => resolve_table(&table),
        Some(other) => Err(ConfigError::InvalidTable {
            key: "sanity".to_string(),
            found: other.type_str(),
        }),
        None => Ok(SanitySettings::default()),
    }
}

fn resolve_table(table: &toml::Table) -> Result<SanitySettings, ConfigError> {
    let mut flat = HashMap::new();
    flatten("", table, &mut flat)?;
    SanitySettings::resolve(&flat)
}

/// Flatten nested tables into dotted keys, so that
/// `[sanity.check_form] assume_form_on_blank = true` and
/// `"check_form.assume_form_on_blank" = true` mean the same thing.
fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut HashMap<String, FlagValue>,
) -> Result<(), ConfigError> {
    for (key, value) in table {
        let key = format!("{prefix}{key}");
        match value {
            toml::Value::Boolean(flag) => {
                out.insert(key, FlagValue::Bool(*flag));
            }
            toml::Value::String(text) => {
                out.insert(key, FlagValue::Text(text.clone()));
            }
            toml::Value::Integer(number) => {
                out.insert(key, FlagValue::Text(number.to_string()));
            }
            toml::Value::Table(nested) => flatten(&format!("{key}."), nested, out)?,
            other => {
                return Err(ConfigError::InvalidBool {
                    key,
                    value: other.to_string(),
                })
            }
        }
    }
    Ok(())
}
