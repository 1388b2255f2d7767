//! Wire types for the platform REST API.
//!
//! Requests and responses are explicit records with `camelCase` wire names.
//! Connector configuration payloads stay opaque (`serde_json::Value`)
//! because their shape is defined by the connector, not by this crate.

use serde::{Deserialize, Serialize};

// ============================================================================
// Sources and destinations
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourceRequest {
    pub name: String,
    pub source_definition_id: String,
    pub workspace_id: String,
    pub connection_configuration: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourceResponse {
    pub source_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDestinationRequest {
    pub name: String,
    pub destination_definition_id: String,
    pub workspace_id: String,
    pub connection_configuration: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDestinationResponse {
    pub destination_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSourceRequest {
    pub source_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDestinationRequest {
    pub destination_id: String,
}

/// Outcome of a source or destination validation check.
///
/// The platform reports `"succeeded"` on success and a failure description
/// otherwise. Anything other than the success literal, including an absent
/// status field, counts as a failed check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConnectionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CheckConnectionResponse {
    /// Status literal the platform uses for a passing check.
    pub const SUCCEEDED: &'static str = "succeeded";

    /// Whether the check passed.
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some(Self::SUCCEEDED)
    }
}

// ============================================================================
// Schema discovery
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverSchemaRequest {
    pub source_id: String,
    pub connector_type: String,
    /// Discovery scope. Omitted from the wire when no filter was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFilter>,
}

/// Scope filter for schema discovery. Only the supplied fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
}

impl SchemaFilter {
    /// Whether no filter field is set. An empty filter is left off the wire.
    pub fn is_empty(&self) -> bool {
        self.database.is_none()
            && self.schema.is_none()
            && self.tables.as_ref().map_or(true, |t| t.is_empty())
    }
}

/// Full discovery result: every stream the source exposes within the
/// requested scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveredCatalog {
    #[serde(default)]
    pub streams: Vec<DiscoveredStreamEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredStreamEntry {
    pub stream: DiscoveredStream,
}

/// One discoverable table/collection as the source describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredStream {
    pub name: String,
    /// JSON schema of the stream's records. Opaque to this crate.
    #[serde(default)]
    pub json_schema: serde_json::Value,
    #[serde(default)]
    pub supported_sync_modes: Vec<String>,
    /// Cursor the source itself declared, empty when none.
    #[serde(default)]
    pub source_defined_cursor: Vec<String>,
    /// Primary key the source itself declared, empty when none.
    #[serde(default)]
    pub source_defined_primary_key: Vec<Vec<String>>,
}

// ============================================================================
// Sync catalog
// ============================================================================

/// The set of streams and per-stream replication settings attached to a
/// connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncCatalog {
    pub streams: Vec<ConfiguredStream>,
}

/// One stream of the sync catalog: a trimmed stream descriptor plus the
/// replication settings chosen for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredStream {
    pub stream: ConfiguredStreamDescriptor,
    pub sync_mode: String,
    pub destination_sync_mode: String,
    pub cursor_field: Vec<String>,
    pub primary_key: Vec<Vec<String>>,
}

/// The parts of a discovered stream that the connection payload carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredStreamDescriptor {
    pub name: String,
    pub json_schema: serde_json::Value,
    pub supported_sync_modes: Vec<String>,
}

// ============================================================================
// Connections
// ============================================================================

/// Replication schedule, e.g. every 5 minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub units: u32,
    pub time_unit: String,
}

/// Whether the connection starts out scheduled or paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Inactive,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionStatus::Active => "active",
            ConnectionStatus::Inactive => "inactive",
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Active
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub name: String,
    pub source_id: String,
    pub destination_id: String,
    pub namespace_format: String,
    pub schedule: Schedule,
    pub sync_catalog: SyncCatalog,
    pub auto_propagate_schema: bool,
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionResponse {
    pub connection_id: String,
}
