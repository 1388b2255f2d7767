//! The provisioning run.
//!
//! One invocation performs one linear sequence: create source, validate it,
//! create destination, validate it, discover the schema and build the sync
//! catalog, create the connection. The first failure halts the run.
//!
//! Nothing is rolled back on failure: resources created before the failing
//! step stay behind in the remote workspace and must be cleaned up out of
//! band. Error messages name the ids created so far for that purpose.

use crate::catalog::build_sync_catalog;
use crate::config::{ConnectionConfig, DestinationConfig, SourceConfig};
use anyhow::Context;
use platform_client::types::CreateConnectionRequest;
use platform_client::PlatformClient;

/// Identifiers of the resources created by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedPipeline {
    pub source_id: String,
    pub destination_id: String,
    pub connection_id: String,
}

/// Run the full provisioning sequence.
pub async fn run_provision(
    client: &PlatformClient,
    source: SourceConfig,
    destination: DestinationConfig,
    connection: ConnectionConfig,
) -> anyhow::Result<ProvisionedPipeline> {
    // Source
    tracing::info!("Creating source '{}'", source.name);
    let source_id = client
        .create_source(
            &source.name,
            &source.definition_id,
            source.connection_configuration,
        )
        .await
        .context("Failed to create source")?;

    tracing::info!("Validating source (id={source_id})");
    let source_ok = client
        .check_source(&source_id)
        .await
        .context("Failed to check source")?;
    if !source_ok {
        anyhow::bail!(
            "Source check failed for '{}'; source {source_id} is left behind in the workspace",
            source.name
        );
    }
    tracing::info!("Source created and validated (id={source_id})");

    // Destination
    tracing::info!("Creating destination '{}'", destination.name);
    let destination_id = client
        .create_destination(
            &destination.name,
            &destination.definition_id,
            destination.connection_configuration,
        )
        .await
        .context("Failed to create destination")?;

    tracing::info!("Validating destination (id={destination_id})");
    let destination_ok = client
        .check_destination(&destination_id)
        .await
        .context("Failed to check destination")?;
    if !destination_ok {
        anyhow::bail!(
            "Destination check failed for '{}'; source {source_id} and destination {destination_id} are left behind in the workspace",
            destination.name
        );
    }
    tracing::info!("Destination created and validated (id={destination_id})");

    // Catalog
    tracing::info!(
        "Discovering schema for source {source_id} ({} tables requested)",
        connection.tables.len()
    );
    let sync_catalog = build_sync_catalog(client, &source_id, &connection)
        .await
        .context("Failed to build sync catalog")?;
    tracing::info!("Sync catalog built with {} streams", sync_catalog.streams.len());

    // Connection
    tracing::info!("Creating connection '{}'", connection.name);
    let request = CreateConnectionRequest {
        name: connection.name.clone(),
        source_id: source_id.clone(),
        destination_id: destination_id.clone(),
        namespace_format: connection.namespace_format.clone(),
        schedule: connection.schedule.clone(),
        sync_catalog,
        auto_propagate_schema: connection.auto_propagate_schema,
        status: connection.status,
    };
    let connection_id = client
        .create_connection(&request)
        .await
        .context("Failed to create connection")?;

    tracing::info!("Pipeline provisioned successfully (connection id={connection_id})");

    Ok(ProvisionedPipeline {
        source_id,
        destination_id,
        connection_id,
    })
}
