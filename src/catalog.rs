//! Sync catalog construction.
//!
//! Turns a raw discovery result plus the requested table list into the
//! exact catalog shape the connection-creation call requires: each retained
//! stream keeps the schema and source-defined cursor/key from discovery and
//! gains the caller-chosen sync modes.

use crate::config::ConnectionConfig;
use platform_client::types::{
    ConfiguredStream, ConfiguredStreamDescriptor, DiscoveredCatalog, SchemaFilter, SyncCatalog,
};
use platform_client::PlatformClient;
use std::collections::HashSet;

/// Error type for catalog construction.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Discovery returned zero streams
    #[error("Discovery returned no streams for tables {tables:?}")]
    NoStreams { tables: Vec<String> },

    /// One or more requested tables were absent from the discovered streams
    #[error("Requested tables were not discovered: {missing:?}")]
    MissingTables { missing: Vec<String> },

    /// A requested table appeared more than once in the discovered streams
    #[error("Table '{0}' was discovered more than once")]
    DuplicateStream(String),
}

/// Discover the source schema scoped to the connection's database, schema,
/// and table list, then build the sync catalog.
pub async fn build_sync_catalog(
    client: &PlatformClient,
    source_id: &str,
    connection: &ConnectionConfig,
) -> anyhow::Result<SyncCatalog> {
    let filter = SchemaFilter {
        database: connection.database.clone(),
        schema: connection.schema.clone(),
        tables: Some(connection.tables.clone()),
    };

    let discovered = client.discover_schema(source_id, filter).await?;
    tracing::debug!(
        "Discovery returned {} streams for source {source_id}",
        discovered.streams.len()
    );

    let catalog = filter_catalog(
        discovered,
        &connection.tables,
        &connection.sync_mode,
        &connection.destination_sync_mode,
    )?;
    Ok(catalog)
}

/// Filter discovered streams down to the requested tables and tag each with
/// the chosen sync modes.
///
/// Output order follows discovery order, not the requested order. Every
/// requested table must be retained exactly once; a shortfall fails naming
/// exactly the missing tables. `tables` must already be free of duplicates
/// (see [`ConnectionConfig::validate`]).
pub fn filter_catalog(
    discovered: DiscoveredCatalog,
    tables: &[String],
    sync_mode: &str,
    destination_sync_mode: &str,
) -> Result<SyncCatalog, CatalogError> {
    if discovered.streams.is_empty() {
        return Err(CatalogError::NoStreams {
            tables: tables.to_vec(),
        });
    }

    let requested: HashSet<&str> = tables.iter().map(String::as_str).collect();
    let mut retained: HashSet<String> = HashSet::new();
    let mut streams = Vec::with_capacity(tables.len());

    for entry in discovered.streams {
        let stream = entry.stream;
        if !requested.contains(stream.name.as_str()) {
            continue;
        }
        if !retained.insert(stream.name.clone()) {
            return Err(CatalogError::DuplicateStream(stream.name));
        }
        streams.push(ConfiguredStream {
            stream: ConfiguredStreamDescriptor {
                name: stream.name,
                json_schema: stream.json_schema,
                supported_sync_modes: stream.supported_sync_modes,
            },
            sync_mode: sync_mode.to_string(),
            destination_sync_mode: destination_sync_mode.to_string(),
            cursor_field: stream.source_defined_cursor,
            primary_key: stream.source_defined_primary_key,
        });
    }

    if streams.len() != tables.len() {
        let mut missing: Vec<String> = tables
            .iter()
            .filter(|name| !retained.contains(name.as_str()))
            .cloned()
            .collect();
        missing.sort();
        return Err(CatalogError::MissingTables { missing });
    }

    Ok(SyncCatalog { streams })
}
