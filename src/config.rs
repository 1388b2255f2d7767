//! Configuration documents for a provisioning run.
//!
//! A run is described by three YAML documents: the source connector, the
//! destination connector, and the connection to create between them. Each
//! document parses into a typed struct; missing required keys are parse
//! errors, reported before any remote call is made.
//!
//! The opaque `connectionConfiguration` maps may reference environment
//! variables as `${VAR}` inside string values. References are resolved
//! explicitly against named variables after parsing, so a missing variable
//! is reported by name and value outside those maps (such as the
//! platform-side `namespaceFormat` template) are never touched.

use platform_client::types::{ConnectionStatus, Schedule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `${VAR}` reference points at an unset environment variable
    #[error("Environment variable '{name}' referenced by '{key}' is not set")]
    MissingEnvVar { key: String, name: String },

    /// The connection document requests no tables
    #[error("Connection config lists no tables")]
    NoTables,

    /// The same table is requested more than once
    #[error("Duplicate table '{0}' in requested table list")]
    DuplicateTable(String),
}

/// Source connector document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Human-readable connector name
    pub name: String,

    /// Connector type (definition id) on the platform
    pub definition_id: String,

    /// Opaque connector configuration passed through to the platform
    pub connection_configuration: serde_json::Value,
}

impl SourceConfig {
    /// Load from a YAML file and resolve `${VAR}` references against the
    /// process environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        resolve_refs(
            &mut config.connection_configuration,
            "connectionConfiguration",
            &env_lookup,
        )?;
        Ok(config)
    }

    /// Parse from a YAML string without resolving `${VAR}` references.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Destination connector document. Same shape as [`SourceConfig`] but for
/// the warehouse connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationConfig {
    pub name: String,
    pub definition_id: String,
    pub connection_configuration: serde_json::Value,
}

impl DestinationConfig {
    /// Load from a YAML file and resolve `${VAR}` references against the
    /// process environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        resolve_refs(
            &mut config.connection_configuration,
            "connectionConfiguration",
            &env_lookup,
        )?;
        Ok(config)
    }

    /// Parse from a YAML string without resolving `${VAR}` references.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Connection document: what to replicate and on what cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Human-readable connection name
    pub name: String,

    /// Destination namespace template, resolved by the platform itself
    #[serde(default = "default_namespace_format")]
    pub namespace_format: String,

    /// Replication schedule
    pub schedule: Schedule,

    /// Source database to scope discovery to
    #[serde(default)]
    pub database: Option<String>,

    /// Source schema to scope discovery to
    #[serde(default)]
    pub schema: Option<String>,

    /// Tables to replicate
    pub tables: Vec<String>,

    /// Sync mode applied to every stream (e.g. "incremental")
    pub sync_mode: String,

    /// Destination sync mode applied to every stream (e.g. "append_dedup")
    pub destination_sync_mode: String,

    /// Whether the platform should propagate upstream schema changes
    #[serde(default = "default_auto_propagate")]
    pub auto_propagate_schema: bool,

    /// Initial connection status
    #[serde(default)]
    pub status: ConnectionStatus,
}

fn default_namespace_format() -> String {
    "${SOURCE_NAMESPACE}".to_string()
}

fn default_auto_propagate() -> bool {
    true
}

impl ConnectionConfig {
    /// Load from a YAML file and validate the table list.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML string without validating.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reject an empty table list and duplicate table names.
    ///
    /// A duplicate would otherwise make the catalog count check report a
    /// table as missing when it was discovered fine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tables.is_empty() {
            return Err(ConfigError::NoTables);
        }
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.as_str()) {
                return Err(ConfigError::DuplicateTable(table.clone()));
            }
        }
        Ok(())
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve `${VAR}` references inside every string value of `value`.
///
/// `key` names the position being resolved (dotted path) so a missing
/// variable can be reported with where it was referenced from.
pub fn resolve_refs(
    value: &mut serde_json::Value,
    key: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    match value {
        serde_json::Value::String(s) => {
            *s = substitute(s, key, lookup)?;
        }
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                resolve_refs(item, &format!("{key}[{index}]"), lookup)?;
            }
        }
        serde_json::Value::Object(map) => {
            for (field, item) in map.iter_mut() {
                resolve_refs(item, &format!("{key}.{field}"), lookup)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Replace every `${NAME}` occurrence in `input` with `lookup(NAME)`.
/// Text without a closing brace is kept as-is.
fn substitute(
    input: &str,
    key: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        match lookup(name) {
            Some(replacement) => out.push_str(&replacement),
            None => {
                return Err(ConfigError::MissingEnvVar {
                    key: key.to_string(),
                    name: name.to_string(),
                })
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
